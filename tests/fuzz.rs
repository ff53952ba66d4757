use daos_acl::*;
use rand::Rng;

const ROUNDS: usize = 500;

fn header(version: u16, table_len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ACL_HEADER_LEN + table_len);

    buf.extend_from_slice(&version.to_ne_bytes());
    buf.extend_from_slice(&0u16.to_ne_bytes());
    buf.extend_from_slice(&(table_len as u32).to_ne_bytes());
    buf
} // header

/// Checks an accepted buffer without going through the validator.
fn assert_well_formed(buf: &[u8]) {
    let acl = Acl::from_bytes(buf).unwrap();
    let entries: Vec<AceRef<'_>> = acl.iter().collect();

    assert_eq!(acl.as_bytes(), buf);
    assert_eq!(acl.version(), ACL_VERSION);
    assert_eq!(entries.iter().map(|e| e.size()).sum::<usize>(), acl.table_len());
    assert!(entries.iter().all(|e| e.is_valid()));
    for pair in entries.windows(2) {
        assert!(pair[0].principal_type() <= pair[1].principal_type());
    } // for
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            assert!(!is_duplicate(a, b));
        } // for
    } // for
} // assert_well_formed

fn check(buf: &[u8]) {
    match validate_bytes(buf) {
        Ok(())                         => assert_well_formed(buf),
        Err(Error::InvalidArgument(_)) => assert!(Acl::from_bytes(buf).is_err()),
        Err(e)                         => panic!("unexpected error {:?}", e),
    } // match
} // check

#[test]
fn random_tables() {
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let table_len = rng.gen_range(0..=64) * 8;
        let mut buf = header(ACL_VERSION, table_len);
        let mut table = vec![0u8; table_len];

        rng.fill(&mut table[..]);
        buf.extend_from_slice(&table);
        check(&buf);
    } // for
} // random_tables

#[test]
fn random_buffers() {
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let mut buf = vec![0u8; rng.gen_range(0..=256)];

        rng.fill(&mut buf[..]);
        check(&buf);
    } // for
} // random_buffers

/// Random entries with plausible headers, so that the walk gets past the framing checks.
#[test]
fn random_entries() {
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let mut table = Vec::new();

        for _ in 0..rng.gen_range(0..=6) {
            let name_len: u16 = if rng.gen_bool(0.5) { 0 } else { rng.gen_range(1..=4) * 8 };
            let mut entry = vec![0u8; ACE_HEADER_LEN + name_len as usize];

            entry[0] = rng.gen_range(0..8);
            entry[1] = rng.gen_range(0..6);
            entry[2..4].copy_from_slice(&name_len.to_ne_bytes());
            entry[4..6].copy_from_slice(&rng.gen_range(0u16..16).to_ne_bytes());
            entry[8..16].copy_from_slice(&rng.gen_range(0u64..4).to_ne_bytes());
            entry[16..24].copy_from_slice(&rng.gen_range(0u64..4).to_ne_bytes());
            entry[24..32].copy_from_slice(&rng.gen_range(0u64..4).to_ne_bytes());
            for b in &mut entry[ACE_HEADER_LEN..] {
                *b = if rng.gen_bool(0.2) { 0 } else { rng.gen_range(b'a'..=b'z') };
            } // for
            table.extend_from_slice(&entry);
        } // for

        let mut buf = header(ACL_VERSION, table.len());
        buf.extend_from_slice(&table);
        check(&buf);
    } // for
} // random_entries

/// Valid ACLs with a few bytes flipped.
#[test]
fn mutated_acls() {
    let mut rng = rand::thread_rng();
    let acl = Acl::from_strings(&[
        "A::OWNER@:rw",
        "A::alice@:rw",
        "AD:F:bob@example.com:r",
        "A:G:GROUP@:r",
        "L:GS:staff@:w",
        "A::EVERYONE@:",
    ]).unwrap();

    check(acl.as_bytes());
    for _ in 0..ROUNDS {
        let mut buf = acl.as_bytes().to_vec();

        for _ in 0..rng.gen_range(1..=3) {
            let i = rng.gen_range(0..buf.len());
            buf[i] ^= 1 << rng.gen_range(0..8);
        } // for
        check(&buf);
    } // for
} // mutated_acls
