//! Compact string form of entries and lists, `access:flags:principal:perms`.
//!
//! * access: any of `A` (allow), `D` (audit), `L` (alarm)
//! * flags: any of `G` (group), `P` (pool inherit), `F` (audit on failure), `S` (audit on success)
//! * principal: `OWNER@`, `GROUP@` or `EVERYONE@` for the special principals, otherwise the
//!   `name@domain` of a user, or of a group if the `G` flag is given
//! * perms: any of `r` (read), `w` (write)
//!
//! A single permission field serves every access type present, so an entry with different
//! permissions per access type has no string form.

use log::{trace, warn};
use std::str::FromStr;

use crate::ace::{
    Ace, AceRead, PrincipalType, ACCESS_ALARM, ACCESS_ALLOW, ACCESS_AUDIT, FLAG_ACCESS_FAIL,
    FLAG_ACCESS_SUCCESS, FLAG_GROUP, FLAG_POOL_INHERIT, MAX_PRINCIPAL_LEN, PERM_READ, PERM_WRITE,
};
use crate::acl::Acl;
use crate::principal;
use crate::Error;


/// Maximum length of an entry in string form.
pub const MAX_ACE_STR_LEN: usize = MAX_PRINCIPAL_LEN + 64;

const OWNER_TOKEN: &str = "OWNER@";
const OWNER_GROUP_TOKEN: &str = "GROUP@";
const EVERYONE_TOKEN: &str = "EVERYONE@";

const ACCESS_TOKENS: [(char, u64); 3] = [
    ('A', ACCESS_ALLOW as u64),
    ('D', ACCESS_AUDIT as u64),
    ('L', ACCESS_ALARM as u64),
];

const FLAG_TOKENS: [(char, u64); 4] = [
    ('G', FLAG_GROUP as u64),
    ('P', FLAG_POOL_INHERIT as u64),
    ('F', FLAG_ACCESS_FAIL as u64),
    ('S', FLAG_ACCESS_SUCCESS as u64),
];

const PERM_TOKENS: [(char, u64); 2] = [
    ('r', PERM_READ),
    ('w', PERM_WRITE),
];

fn invalid(reason: String) -> Error {
    warn!("{}", reason);
    Error::InvalidArgument(reason)
} // invalid

fn letters(bits: u64, tokens: &[(char, u64)]) -> String {
    tokens.iter().filter(|(_, bit)| bits & bit != 0).map(|(c, _)| *c).collect()
} // letters

fn parse_letters(field: &str, tokens: &[(char, u64)], what: &str) -> Result<u64, Error> {
    let mut bits = 0;

    for c in field.chars() {
        match tokens.iter().find(|(t, _)| *t == c) {
            Some((_, bit)) => bits |= bit,
            None           => return Err(invalid(format!("unknown {} token '{}'", what, c))),
        } // match
    } // for
    Ok(bits)
} // parse_letters

fn special_token(ptype: PrincipalType) -> Option<&'static str> {
    match ptype {
        PrincipalType::Owner      => Some(OWNER_TOKEN),
        PrincipalType::OwnerGroup => Some(OWNER_GROUP_TOKEN),
        PrincipalType::Everyone   => Some(EVERYONE_TOKEN),
        _                         => None,
    } // match
} // special_token

fn special_type(token: &str) -> Option<PrincipalType> {
    match token {
        OWNER_TOKEN       => Some(PrincipalType::Owner),
        OWNER_GROUP_TOKEN => Some(PrincipalType::OwnerGroup),
        EVERYONE_TOKEN    => Some(PrincipalType::Everyone),
        _                 => None,
    } // match
} // special_type


// Entry //////////////////////////////////////////////////////////////////////////////////////////


pub(crate) fn ace_to_string<A: AceRead + ?Sized>(ace: &A) -> Result<String, Error> {
    if !ace.is_valid() {
        return Err(invalid(String::from("cannot format an invalid entry")));
    } // if

    let ptype = ace.principal_type()
        .ok_or_else(|| invalid(String::from("cannot format an entry without principal type")))?;
    let access = ace.access_types();
    let mut perms: Option<u64> = None;

    for &(_, bit) in &ACCESS_TOKENS {
        if access as u64 & bit == 0 {
            continue;
        } // if

        let these = ace.perms(bit as u8).unwrap_or(0);

        match perms {
            Some(p) if p != these => {
                return Err(invalid(String::from("permissions differ between access types")));
            }, // Some
            _ => perms = Some(these),
        } // match
    } // for

    let principal = match special_token(ptype) {
        Some(token) => token,
        None        => {
            let name = ace.principal()
                .ok_or_else(|| invalid(String::from("principal name is not valid UTF-8")))?;
            if !principal::is_valid(name) || special_type(name).is_some() || name.contains(':') {
                return Err(invalid(format!("principal name '{}' has no string form", name)));
            } // if
            name
        }, // None
    }; // match

    Ok(format!(
        "{}:{}:{}:{}",
        letters(access as u64, &ACCESS_TOKENS),
        letters(ace.access_flags() as u64, &FLAG_TOKENS),
        principal,
        letters(perms.unwrap_or(0), &PERM_TOKENS),
    ))
} // ace_to_string

impl FromStr for Ace {
    type Err = Error;

    /// Parses the compact string form. The result is always a valid entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        trace!("parsing ace from {:?}", s);
        if s.len() > MAX_ACE_STR_LEN {
            return Err(invalid(format!("entry string exceeds {} bytes", MAX_ACE_STR_LEN)));
        } // if

        let fields: Vec<&str> = s.split(':').collect();

        if fields.len() != 4 {
            return Err(invalid(format!("expected 4 fields in {:?}, found {}", s, fields.len())));
        } // if

        let access = parse_letters(fields[0], &ACCESS_TOKENS, "access type")? as u8;
        let flags  = parse_letters(fields[1], &FLAG_TOKENS, "flag")? as u16;
        let perms  = parse_letters(fields[3], &PERM_TOKENS, "permission")?;

        let (ptype, name) = match special_type(fields[2]) {
            Some(ptype) => {
                if flags & FLAG_GROUP != 0 && !ptype.is_group() {
                    return Err(invalid(format!("group flag given for {}", fields[2])));
                } // if
                (ptype, None)
            }, // Some
            None => {
                if !principal::is_valid(fields[2]) {
                    return Err(invalid(format!("malformed principal {:?}", fields[2])));
                } // if
                let ptype = if flags & FLAG_GROUP != 0 { PrincipalType::Group } else { PrincipalType::User };
                (ptype, Some(fields[2]))
            }, // None
        }; // match

        let mut ace = Ace::new(ptype, name)?;

        ace.set_access_types(access);
        ace.set_access_flags(ace.access_flags() | flags);
        for &(_, bit) in &ACCESS_TOKENS {
            if access as u64 & bit != 0 {
                ace.set_perms(bit as u8, perms)?;
            } // if
        } // for

        if !ace.is_valid() {
            return Err(invalid(format!("{:?} does not describe a valid entry", s)));
        } // if
        Ok(ace)
    } // from_str

} // impl FromStr for Ace


// List ///////////////////////////////////////////////////////////////////////////////////////////


impl Acl {

    /// One string per entry, in table order.
    pub fn to_strings(&self) -> Result<Vec<String>, Error> {
        trace!("formatting acl as strings");
        self.iter().map(|entry| entry.to_compact_string()).collect()
    } // to_strings

    /// Builds an ACL from entry strings. Entries are sorted into canonical order; two strings for
    /// the same principal are rejected rather than merged.
    pub fn from_strings<S: AsRef<str>>(strings: &[S]) -> Result<Acl, Error> {
        trace!("parsing acl from {} strings", strings.len());
        let aces = strings.iter()
            .map(|s| s.as_ref().parse::<Ace>())
            .collect::<Result<Vec<_>, _>>()?;
        let acl = Acl::new(&aces)?;

        acl.validate()?;
        Ok(acl)
    } // from_strings

} // impl Acl


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
