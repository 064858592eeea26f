//! Known RMi/HXi models and their USB product identifiers.
//!
//! Finding the device on the bus is left to the caller. This only names what
//! was found.

use strum_macros::{EnumIter, IntoStaticStr};

/// Corsair's USB vendor identifier.
pub const VENDOR_ID: u16 = 0x1b1c;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[repr(u16)]
pub enum PsuModel {
    #[strum(serialize = "RM650i")]
    Rm650i = 0x1c0a,
    #[strum(serialize = "RM750i")]
    Rm750i = 0x1c0b,
    #[strum(serialize = "RM850i")]
    Rm850i = 0x1c0c,
    #[strum(serialize = "RM1000i")]
    Rm1000i = 0x1c0d,
    #[strum(serialize = "HX650i")]
    Hx650i = 0x1c04,
    #[strum(serialize = "HX750i")]
    Hx750i = 0x1c05,
    #[strum(serialize = "HX850i")]
    Hx850i = 0x1c06,
    #[strum(serialize = "HX1000i")]
    Hx1000i = 0x1c07,
    #[strum(serialize = "HX1200i")]
    Hx1200i = 0x1c08,
}

impl PsuModel {
    pub fn from_product_id(product_id: u16) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|model| model.product_id() == product_id)
    }

    pub const fn product_id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}
