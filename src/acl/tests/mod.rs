use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::*;
use crate::types::TagKind;
use yare::parameterized;


const SAMPLE_HEX: &str = "0200000001000700ffffffff04000700ffffffff08000700b615000010000700ffffffff20000500ffffffff";

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn perm(bits: u16) -> Permission {
    Permission::from_bits(bits)
}

fn acl_of(entries: Vec<Entry>) -> Acl {
    let mut acl = Acl::new();
    for entry in entries {
        acl.add_entry(entry);
    }
    acl
}

fn tags(acl: &Acl) -> Vec<Tag> {
    acl.iter().map(|e| e.tag()).collect()
}

/// In-memory attribute store keyed by path and attribute name.
#[derive(Default)]
struct MemoryStore {
    attrs: RefCell<HashMap<(PathBuf, &'static str), Vec<u8>>>,
    stats: HashMap<PathBuf, StatInfo>,
    fail_with: Option<io::ErrorKind>,
}

impl MemoryStore {
    fn with_stat(path: &str, stat: StatInfo) -> Self {
        MemoryStore {
            stats: HashMap::from([(PathBuf::from(path), stat)]),
            ..Default::default()
        }
    }

    fn failing(kind: io::ErrorKind) -> Self {
        MemoryStore {
            fail_with: Some(kind),
            ..Default::default()
        }
    }

    fn insert(&self, path: &str, kind: AclKind, value: Vec<u8>) {
        self.attrs
            .borrow_mut()
            .insert((PathBuf::from(path), kind.attr_name()), value);
    }

    fn stored(&self, path: &str, kind: AclKind) -> Option<Vec<u8>> {
        self.attrs
            .borrow()
            .get(&(PathBuf::from(path), kind.attr_name()))
            .cloned()
    }

    fn check(&self) -> io::Result<()> {
        match self.fail_with {
            Some(kind) => Err(io::Error::new(kind, "simulated failure")),
            None => Ok(()),
        }
    }
}

impl AttributeStore for MemoryStore {
    fn read(&self, path: &Path, kind: AclKind) -> io::Result<Option<Vec<u8>>> {
        self.check()?;
        Ok(self
            .attrs
            .borrow()
            .get(&(path.to_path_buf(), kind.attr_name()))
            .cloned())
    }

    fn write(&self, path: &Path, kind: AclKind, value: &[u8]) -> io::Result<()> {
        self.check()?;
        self.attrs
            .borrow_mut()
            .insert((path.to_path_buf(), kind.attr_name()), value.to_vec());
        Ok(())
    }

    fn stat(&self, path: &Path) -> io::Result<StatInfo> {
        self.check()?;
        self.stats
            .get(path)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

#[derive(Clone)]
struct SharedLogBuffer(Arc<Mutex<Vec<u8>>>);

struct SharedLogWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(Arc::clone(&self.0))
    }
}

impl io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local debug subscriber and return what it logged.
fn capture_logs(f: impl FnOnce()) -> String {
    let sink = SharedLogBuffer(Arc::new(Mutex::new(Vec::new())));
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        f();
    });
    String::from_utf8(sink.0.lock().unwrap().clone()).unwrap()
}

#[test]
fn test_parse_sample_payload() {
    let acl = Acl::parse(&hex(SAMPLE_HEX)).unwrap();
    assert_eq!(acl.version(), 2);
    assert_eq!(
        acl.entries(),
        vec![
            Entry::user_obj(Permission::ALL),
            Entry::group_obj(Permission::ALL),
            Entry::group(5558, Permission::ALL),
            Entry::mask(Permission::ALL),
            Entry::other(perm(5)),
        ]
    );
}

#[test]
fn test_serialize_sample_payload_is_identical() {
    let bytes = hex(SAMPLE_HEX);
    let mut acl = Acl::parse(&bytes).unwrap();
    assert_eq!(acl.to_bytes(), bytes);
}

#[test]
fn test_parse_header_only_is_empty() {
    let acl = Acl::parse(&[0x02, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(acl.version(), ACL_EA_VERSION);
    assert!(acl.is_empty());
}

#[parameterized(
    empty = { "" },
    one_byte = { "02" },
    two_bytes = { "0200" },
    three_bytes = { "020000" },
)]
fn test_parse_truncated_header(input: &str) {
    let bytes = hex(input);
    match Acl::parse(&bytes) {
        Err(AclError::TruncatedHeader { len }) => assert_eq!(len, bytes.len()),
        other => panic!("Expected TruncatedHeader error, got {other:?}"),
    }
}

#[parameterized(
    five_trailing = { "0200000001000700ff", 5 },
    one_trailing = { "0200000001", 1 },
    one_record_plus_one = { "0200000001000700ffffffff04", 1 },
    one_record_plus_seven = { "0200000001000700ffffffff04000700ffffff", 7 },
)]
fn test_parse_malformed_tail(input: &str, remaining: usize) {
    match Acl::parse(&hex(input)) {
        Err(AclError::MalformedData { remaining: got }) => assert_eq!(got, remaining),
        other => panic!("Expected MalformedData error, got {other:?}"),
    }
}

#[test]
fn test_serialize_canonicalizes_any_insertion_order() {
    let mut shuffled = acl_of(vec![
        Entry::mask(Permission::ALL),
        Entry::other(perm(5)),
        Entry::user_obj(Permission::ALL),
        Entry::group(5558, Permission::ALL),
        Entry::group_obj(Permission::ALL),
    ]);
    let mut sorted = acl_of(vec![
        Entry::user_obj(Permission::ALL),
        Entry::group_obj(Permission::ALL),
        Entry::group(5558, Permission::ALL),
        Entry::mask(Permission::ALL),
        Entry::other(perm(5)),
    ]);

    assert_eq!(shuffled.to_bytes(), sorted.to_bytes());
    assert_eq!(sorted.to_bytes(), hex(SAMPLE_HEX));
    assert_eq!(
        tags(&shuffled),
        vec![Tag::USER_OBJ, Tag::GROUP_OBJ, Tag::GROUP, Tag::MASK, Tag::OTHER]
    );
}

#[test]
fn test_canonical_order_is_stable_for_equal_tags() {
    let mut acl = acl_of(vec![
        Entry::group(9, Permission::READ),
        Entry::user(2, Permission::READ),
        Entry::other(Permission::NONE),
        Entry::user(1, Permission::WRITE),
        Entry::group(3, Permission::ALL),
    ]);
    acl.canonicalize();
    let ids: Vec<(Tag, u32)> = acl.iter().map(|e| (e.tag(), e.id())).collect();
    assert_eq!(
        ids,
        vec![
            (Tag::USER, 2),
            (Tag::USER, 1),
            (Tag::GROUP, 9),
            (Tag::GROUP, 3),
            (Tag::OTHER, UNDEFINED_ID),
        ]
    );
}

#[test]
fn test_round_trip_preserves_content() {
    let mut acl = acl_of(vec![
        Entry::other(Permission::NONE),
        Entry::user(1000, perm(6)),
        Entry::everyone(Permission::READ),
        Entry::new(Tag::from_code(0x200), 7, perm(0x13)),
        Entry::user_obj(Permission::ALL),
        Entry::group_obj(perm(5)),
        Entry::mask(perm(5)),
    ]);
    acl.set_version(7);
    let original = acl.clone();

    let bytes = acl.to_bytes();
    assert_eq!(bytes.len(), 4 + original.len() * ENTRY_SIZE);

    let parsed = Acl::parse(&bytes).unwrap();
    assert_eq!(parsed, original);
    let parsed_tags: Vec<u16> = parsed.iter().map(|e| e.tag().code()).collect();
    assert!(parsed_tags.is_sorted());
}

#[test]
fn test_try_from_bytes() {
    let bytes = hex(SAMPLE_HEX);
    let acl = Acl::try_from(bytes.as_slice()).unwrap();
    assert_eq!(acl.len(), 5);
    assert!(Acl::try_from(&bytes[..2]).is_err());
}

#[test]
fn test_parse_keeps_encounter_order() {
    let mut bytes = vec![0x02, 0x00, 0x00, 0x00];
    Entry::other(Permission::NONE).write_to(&mut bytes);
    Entry::user_obj(Permission::ALL).write_to(&mut bytes);
    let acl = Acl::parse(&bytes).unwrap();
    assert_eq!(tags(&acl), vec![Tag::OTHER, Tag::USER_OBJ]);
    assert_eq!(
        acl.iter().next().and_then(|e| e.tag().kind()),
        Some(TagKind::Other)
    );
}
