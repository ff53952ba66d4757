//! Validation of untrusted ACL buffers.
//!
//! The header is never trusted on its own: the declared table length has to agree with the buffer
//! that was actually supplied and with the sum of the entry sizes found by walking the table. Every
//! read is bounds-checked against the supplied slice, so arbitrary bytes can be fed in safely.

use log::{trace, warn};
use std::collections::HashSet;

use crate::ace::{self, AceRead, AceRef, PrincipalType};
use crate::acl::{ACL_HEADER_LEN, ACL_VERSION, MAX_ACE_LEN};
use crate::order;
use crate::Error;


fn invalid(reason: String) -> Error {
    warn!("invalid acl: {}", reason);
    Error::InvalidArgument(reason)
} // invalid

/// Validates a packed ACL: header, framing of every entry, every entry's content, canonical order
/// and uniqueness of principals. The slice must hold exactly the header and the declared table.
pub fn validate_bytes(buf: &[u8]) -> Result<(), Error> {
    trace!("validating acl of {} bytes", buf.len());
    if buf.len() < ACL_HEADER_LEN {
        return Err(invalid(format!("buffer of {} bytes is shorter than the header", buf.len())));
    } // if

    let version   = u16::from_ne_bytes([buf[0], buf[1]]);
    let table_len = u32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;

    if version != ACL_VERSION {
        return Err(invalid(format!("unsupported version {}", version)));
    } // if
    if table_len % 8 != 0 {
        return Err(invalid(format!("table length {} is not 64-bit aligned", table_len)));
    } // if
    if table_len > MAX_ACE_LEN {
        return Err(invalid(format!("table length {} exceeds the maximum of {}", table_len, MAX_ACE_LEN)));
    } // if
    if buf.len() - ACL_HEADER_LEN != table_len {
        return Err(invalid(format!("table length {} disagrees with the {} bytes supplied", table_len, buf.len() - ACL_HEADER_LEN)));
    } // if

    validate_table(&buf[ACL_HEADER_LEN..])
} // validate_bytes

/// Walks the entry table from offset 0 and checks each entry as it is found.
fn validate_table(table: &[u8]) -> Result<(), Error> {
    let mut offset = 0;
    let mut last: Option<PrincipalType> = None;
    let mut seen: HashSet<(PrincipalType, &[u8])> = HashSet::new();

    while offset < table.len() {
        let entry = AceRef::parse_at(table, offset)
            .map_err(|reason| invalid(format!("{} at offset {}", reason, offset)))?;

        if !entry.is_valid() {
            return Err(invalid(format!("invalid entry at offset {}", offset)));
        } // if

        let ptype = entry.principal_type()
            .ok_or_else(|| invalid(format!("invalid principal type at offset {}", offset)))?;

        if let Some(prev) = last {
            if order::compare(ptype, prev) == std::cmp::Ordering::Less {
                return Err(invalid(format!("{} entry at offset {} follows {} entry", ptype, offset, prev)));
            } // if
        } // if
        last = Some(ptype);

        // special types carry no name, so the key is the type alone
        if !seen.insert((ptype, ace::name_of(entry.bytes()))) {
            return Err(invalid(format!("duplicate {} entry at offset {}", ptype, offset)));
        } // if
        offset += entry.size();
    } // while

    // parse_at never hands out an entry past the end, so the walk ends exactly on the boundary
    debug_assert_eq!(offset, table.len());
    Ok(())
} // validate_table


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
