//! Internal utilities.

use std::any::Any;
use std::hash::Hash;

use pdf_writer::Name;
use siphasher::sip128::{Hasher128, SipHasher13};

pub(crate) trait NameExt {
    fn to_pdf_name(&self) -> Name;
}

impl NameExt for String {
    fn to_pdf_name(&self) -> Name {
        Name(self.as_bytes())
    }
}

impl NameExt for &str {
    fn to_pdf_name(&self) -> Name {
        Name(self.as_bytes())
    }
}

pub(crate) trait SipHashable {
    fn sip_hash(&self) -> u128;
}

impl<T> SipHashable for T
where
    T: Hash + ?Sized + 'static,
{
    fn sip_hash(&self) -> u128 {
        let mut state = SipHasher13::new();
        self.type_id().hash(&mut state);
        self.hash(&mut state);
        state.finish128().as_u128()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_distinguishes_types_with_equal_bytes() {
        // The type id is part of the hash, so values of different types
        // never collide in the object cache even if their bytes agree.
        let name = "Cyan".to_string();
        let bytes = name.clone().into_bytes();
        assert_ne!(name.sip_hash(), bytes.sip_hash());
    }
}
