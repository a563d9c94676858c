//! Fixed-slot buffers keyed by a closed set of kinds.
//!
//! Intents and actions share the same storage rules: at most one value per
//! kind, setting a kind replaces the previous value, and reads of an absent
//! kind never fail. Each buffer is a vector of optional values indexed by the
//! kind's discriminant, so there is no hashing and no reflection.

use std::fmt;

/// A sum type that can be stored in a [`SlotBuffer`].
pub trait SlotValue: Copy + fmt::Debug {
    /// Number of distinct kinds, and therefore slots.
    const SLOT_COUNT: usize;

    /// Slot index for this value's kind.
    fn slot(&self) -> usize;
}

/// A concrete payload type that maps to exactly one slot of `V`.
pub trait SlotKind<V: SlotValue>: Copy + Default {
    /// Slot index for this payload type.
    const SLOT: usize;

    /// Wrap the payload into the sum type.
    fn into_value(self) -> V;

    /// Extract the payload if `value` is of this kind.
    fn from_value(value: &V) -> Option<Self>;
}

/// One-value-per-kind storage.
#[derive(Debug, Clone)]
pub struct SlotBuffer<V: SlotValue> {
    slots: Vec<Option<V>>,
}

impl<V: SlotValue> Default for SlotBuffer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SlotValue> SlotBuffer<V> {
    /// Create an empty buffer with one slot per kind.
    pub fn new() -> Self {
        Self {
            slots: vec![None; V::SLOT_COUNT],
        }
    }

    /// Upsert a typed value.
    pub fn set<T: SlotKind<V>>(&mut self, value: T) {
        self.slots[T::SLOT] = Some(value.into_value());
    }

    /// Upsert an already-wrapped value into its kind's slot.
    pub fn insert(&mut self, value: V) {
        let slot = value.slot();
        self.slots[slot] = Some(value);
    }

    /// Remove the value of type `T`, if any.
    pub fn remove<T: SlotKind<V>>(&mut self) {
        self.slots[T::SLOT] = None;
    }

    /// Check whether a value of type `T` is present.
    pub fn has<T: SlotKind<V>>(&self) -> bool {
        self.slots[T::SLOT].is_some()
    }

    /// Get the value of type `T`, or its default when absent.
    pub fn get<T: SlotKind<V>>(&self) -> T {
        self.try_get::<T>().unwrap_or_default()
    }

    /// Get the value of type `T` if present.
    pub fn try_get<T: SlotKind<V>>(&self) -> Option<T> {
        self.slots[T::SLOT].as_ref().and_then(T::from_value)
    }

    /// Get the raw value stored at `slot`.
    pub fn value_at(&self, slot: usize) -> Option<&V> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate the stored values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

/// Declare a sum type, its kind enum, and one payload struct per variant,
/// wired up for storage in a [`SlotBuffer`].
macro_rules! slot_kinds {
    (
        $(#[$enum_meta:meta])*
        pub enum $Enum:ident, kind $Kind:ident {
            $(
                $(#[$var_meta:meta])*
                $Variant:ident($Payload:ident) { $($field:ident : $fty:ty),* $(,)? }
            ),* $(,)?
        }
    ) => {
        $(
            $(#[$var_meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct $Payload {
                $(pub $field: $fty,)*
            }

            impl From<$Payload> for $Enum {
                fn from(payload: $Payload) -> Self {
                    $Enum::$Variant(payload)
                }
            }

            impl $crate::buffer::SlotKind<$Enum> for $Payload {
                const SLOT: usize = $Kind::$Variant as usize;

                fn into_value(self) -> $Enum {
                    $Enum::$Variant(self)
                }

                #[allow(unreachable_patterns)]
                fn from_value(value: &$Enum) -> Option<Self> {
                    match value {
                        $Enum::$Variant(payload) => Some(*payload),
                        _ => None,
                    }
                }
            }
        )*

        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $Enum {
            $($Variant($Payload),)*
        }

        /// Discriminant-only view of the sum type, one per slot.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $Kind {
            $($Variant,)*
        }

        impl $Kind {
            /// Every kind in slot order.
            pub const ALL: &'static [$Kind] = &[$($Kind::$Variant,)*];

            /// Slot index of this kind.
            #[inline]
            pub fn slot(self) -> usize {
                self as usize
            }
        }

        impl $Enum {
            /// The kind of this value.
            pub fn kind(&self) -> $Kind {
                match self {
                    $($Enum::$Variant(_) => $Kind::$Variant,)*
                }
            }
        }

        impl $crate::buffer::SlotValue for $Enum {
            const SLOT_COUNT: usize = $Kind::ALL.len();

            fn slot(&self) -> usize {
                self.kind().slot()
            }
        }
    };
}

pub(crate) use slot_kinds;
