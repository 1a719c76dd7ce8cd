use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use data_encoding::BASE32_DNSSEC;
use err_derive::Error;
use rand::distributions::{Distribution, Standard};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use siphasher::sip::SipHasher24;

/// A 128-bit identifier tagged with the entity type it names. Rendered as
/// `<prefix>-<base32>`, where the prefix comes from [`Entity::PREFIX`].
pub struct Id<T> {
    val: [u8; 16],
    phantom: PhantomData<T>,
}

#[derive(Debug, Clone, Error)]
pub enum IdParseError {
    #[error(display = "invalid prefix")]
    InvalidPrefix,
    #[error(display = "unparseable id")]
    Unparseable,
}

pub trait Entity {
    const PREFIX: &'static str;
}

pub(crate) const DIVIDER: &str = "-";

impl<T> Id<T> {
    /// Derives the id from the content's hash; the same input always yields
    /// the same id, so hashing an entity's natural key (e.g. its name) gives
    /// a stable, name-keyed identity.
    pub fn hashed<H: Hash + ?Sized>(entity: &H) -> Self {
        let mut val = [0u8; 16];
        for chunk in 0..2u64 {
            let mut h = SipHasher24::new_with_keys(0, chunk);
            entity.hash(&mut h);
            let start = chunk as usize * 8;
            val[start..start + 8].copy_from_slice(&h.finish().to_be_bytes());
        }
        Id {
            val,
            phantom: PhantomData,
        }
    }
}

impl<T> Distribution<Id<T>> for Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Id<T> {
        Id {
            val: rng.gen(),
            phantom: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Display for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}{}{}", T::PREFIX, DIVIDER, BASE32_DNSSEC.encode(&self.val))
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_tuple("Id")
            .field(&BASE32_DNSSEC.encode(&self.val))
            .finish()
    }
}

impl<T: Entity> std::str::FromStr for Id<T> {
    type Err = IdParseError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let remainder = src
            .strip_prefix(T::PREFIX)
            .ok_or(IdParseError::InvalidPrefix)?;
        let encoded = remainder
            .strip_prefix(DIVIDER)
            .ok_or(IdParseError::Unparseable)?;
        let bytes = BASE32_DNSSEC
            .decode(encoded.as_bytes())
            .map_err(|_| IdParseError::Unparseable)?;
        if bytes.len() != 16 {
            return Err(IdParseError::Unparseable);
        }
        let mut val = [0u8; 16];
        val.copy_from_slice(&bytes);
        Ok(Id {
            val,
            phantom: PhantomData,
        })
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.val.cmp(&other.val)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.val.hash(state)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T: Entity> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, T: Entity> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdStrVisitor<T>(PhantomData<T>);
        impl<'vi, T: Entity> de::Visitor<'vi> for IdStrVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an Id string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id<T>, E> {
                value.parse::<Id<T>>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdStrVisitor(PhantomData))
    }
}
