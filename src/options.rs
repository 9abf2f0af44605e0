//! Display options read live from the DIP switches on every render.
//!
//! Each option is bound either to a fixed boolean or to a switch input. Switches are
//! wired to ground with the pin pulled up, so a closed switch reads low and means `true`.

use embedded_hal::digital::{Error as _, InputPin};

use crate::{Error, Result};

/// The four display options, fully resolved for one render.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionSet {
    /// Show the hour one ahead (summer time).
    pub daylight_saving: bool,
    /// Blink the separator once per second instead of holding it on.
    pub flash_separator: bool,
    /// Show "09:05" rather than " 9:05".
    pub leading_zero: bool,
    /// Show 13:00-23:59 as 1:00-11:59.
    pub twelve_hour_mode: bool,
}

/// Where one option gets its value from.
pub enum OptionSource<P> {
    /// A value decided at build time.
    Fixed(bool),
    /// A pulled-up switch, read at every render.
    Live(P),
}

impl<P: InputPin> OptionSource<P> {
    /// Resolve the option now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SwitchIo`] if the pin cannot be read.
    pub fn value(&mut self) -> Result<bool> {
        match self {
            Self::Fixed(value) => Ok(*value),
            // Pull-up wiring: closed switch pulls the pin low.
            Self::Live(pin) => pin.is_low().map_err(|err| Error::SwitchIo(err.kind())),
        }
    }
}

/// Bindings from each option to its source.
pub struct OptionBindings<P> {
    pub daylight_saving: OptionSource<P>,
    pub flash_separator: OptionSource<P>,
    pub leading_zero: OptionSource<P>,
    pub twelve_hour_mode: OptionSource<P>,
}

impl<P: InputPin> OptionBindings<P> {
    /// The clock's wiring: switch 1 selects summer time, switch 2 selects 12-hour mode,
    /// the separator always blinks and the leading hour digit is blanked.
    pub const fn two_switch(daylight_saving_switch: P, twelve_hour_switch: P) -> Self {
        Self {
            daylight_saving: OptionSource::Live(daylight_saving_switch),
            flash_separator: OptionSource::Fixed(true),
            leading_zero: OptionSource::Fixed(false),
            twelve_hour_mode: OptionSource::Live(twelve_hour_switch),
        }
    }

    /// Read every option. The result is always complete; a failed pin read fails the whole
    /// read rather than leaving an option at a guessed value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SwitchIo`] if any switch cannot be read.
    pub fn read(&mut self) -> Result<OptionSet> {
        Ok(OptionSet {
            daylight_saving: self.daylight_saving.value()?,
            flash_separator: self.flash_separator.value()?,
            leading_zero: self.leading_zero.value()?,
            twelve_hour_mode: self.twelve_hour_mode.value()?,
        })
    }
}
