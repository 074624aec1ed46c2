// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumerated state fields.
//!
//! Each enum maps one-to-one onto the byte values the unit uses on the wire.
//! Symbol names (`as_str`) are the ones used in reports and logs.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

use super::Domain;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $domain:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $byte:literal => $symbol:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All values of the domain, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the symbol name of the value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol,)+
                }
            }
        }

        impl Domain for $name {
            const DOMAIN: &'static str = $domain;

            fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn to_byte(self) -> u8 {
                match self {
                    $(Self::$variant => $byte,)+
                }
            }

            fn from_symbol(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(name.trim()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as Domain>::from_symbol(s).ok_or_else(|| ValueError::UnknownSymbol {
                    domain: $domain,
                    name: s.to_string(),
                })
            }
        }
    };
}

wire_enum! {
    /// Run status of the unit.
    AcStatus, "status" {
        /// Running.
        On = 0x30 => "ON",
        /// Stopped.
        Off = 0x31 => "OFF",
        /// Reported while the unit is in an inconsistent state.
        Invalid = 0x02 => "INVALID",
    }
}

wire_enum! {
    /// Operating mode.
    AcMode, "mode" {
        /// Automatic heat/cool.
        Auto = 0x41 => "AUTO",
        /// Cooling.
        Cool = 0x42 => "COOL",
        /// Heating.
        Heat = 0x43 => "HEAT",
        /// Dehumidifying.
        Dry = 0x44 => "DRY",
        /// Fan only.
        Fan = 0x45 => "FAN",
        /// Not reported.
        Invalid = 0x00 => "INVALID",
    }
}

wire_enum! {
    /// Indoor fan speed.
    AcFanMode, "fan mode" {
        /// Automatic speed.
        Auto = 0x41 => "AUTO",
        /// Quiet.
        Quiet = 0x31 => "QUIET",
        /// Low.
        Low = 0x32 => "LOW",
        /// Medium-low.
        MediumLow = 0x33 => "MEDIUM_LOW",
        /// Medium.
        Medium = 0x34 => "MEDIUM",
        /// Medium-high.
        MediumHigh = 0x35 => "MEDIUM_HIGH",
        /// High.
        High = 0x36 => "HIGH",
        /// Not reported.
        Invalid = 0x00 => "INVALID",
    }
}

wire_enum! {
    /// Louver swing mode.
    AcSwingMode, "swing mode" {
        /// Swing disabled.
        NotUsed = 0x31 => "NOT_USED",
        /// Vertical swing.
        SwingVertical = 0x41 => "SWING_VERTICAL",
        /// Horizontal swing.
        SwingHorizontal = 0x42 => "SWING_HORIZONTAL",
        /// Vertical and horizontal swing.
        SwingVerticalAndHorizontal = 0x43 => "SWING_VERTICAL_AND_HORIZONTAL",
        /// Fixed position 1.
        Fixed1 = 0x50 => "FIXED_1",
        /// Fixed position 2.
        Fixed2 = 0x51 => "FIXED_2",
        /// Fixed position 3.
        Fixed3 = 0x52 => "FIXED_3",
        /// Fixed position 4.
        Fixed4 = 0x53 => "FIXED_4",
        /// Fixed position 5.
        Fixed5 = 0x54 => "FIXED_5",
        /// Not reported.
        Invalid = 0x00 => "INVALID",
    }
}

wire_enum! {
    /// Power limit of the outdoor unit.
    AcPowerSelection, "power selection" {
        /// 50 % power.
        Power50 = 0x32 => "POWER_50",
        /// 75 % power.
        Power75 = 0x4B => "POWER_75",
        /// 100 % power.
        Power100 = 0x64 => "POWER_100",
    }
}

wire_enum! {
    /// Merit B feature (nibble-packed on the wire).
    AcMeritBFeature, "merit B feature" {
        /// Fireplace level 1.
        Fireplace1 = 0x02 => "FIREPLACE_1",
        /// Fireplace level 2.
        Fireplace2 = 0x03 => "FIREPLACE_2",
        /// Feature disabled.
        Off = 0x00 => "OFF",
    }
}

wire_enum! {
    /// Merit A feature (nibble-packed on the wire).
    AcMeritAFeature, "merit A feature" {
        /// High power.
        HighPower = 0x01 => "HIGH_POWER",
        /// Outdoor unit silent level 1.
        CduSilent1 = 0x02 => "CDU_SILENT_1",
        /// Eco.
        Eco = 0x03 => "ECO",
        /// 8 °C frost protection heating.
        Heating8C = 0x04 => "HEATING_8C",
        /// Sleep care.
        SleepCare = 0x05 => "SLEEP_CARE",
        /// Floor heating.
        Floor = 0x06 => "FLOOR",
        /// Comfort.
        Comfort = 0x07 => "COMFORT",
        /// Outdoor unit silent level 2.
        CduSilent2 = 0x0A => "CDU_SILENT_2",
        /// Feature disabled.
        Off = 0x00 => "OFF",
    }
}

wire_enum! {
    /// Air purifier (Pure Ion).
    AcAirPureIon, "air pure ion" {
        /// Purifier off.
        Off = 0x10 => "OFF",
        /// Purifier on.
        On = 0x18 => "ON",
    }
}

wire_enum! {
    /// Self cleaning cycle.
    AcSelfCleaning, "self cleaning" {
        /// Cleaning in progress.
        On = 0x18 => "ON",
        /// No cleaning.
        Off = 0x10 => "OFF",
    }
}

wire_enum! {
    /// Timer mode.
    AcTimerMode, "timer mode" {
        /// Timer off.
        Off = 0x01 => "OFF",
        /// Timer 1.
        Timer1 = 0x02 => "TIMER1",
        /// On timer.
        On = 0x03 => "ON",
        /// Timer 2.
        Timer2 = 0x04 => "TIMER2",
        /// On/off timer.
        OnOff = 0x05 => "ONOFF",
        /// Timer 3.
        Timer3 = 0x06 => "TIMER3",
        /// Timer 4.
        Timer4 = 0x09 => "TIMER4",
        /// Timer 5.
        Timer5 = 0x0A => "TIMER5",
        /// Timer 6.
        Timer6 = 0x0B => "TIMER6",
    }
}

wire_enum! {
    /// Indoor unit LED.
    AcLed, "led" {
        /// LED on.
        On = 0x01 => "ON",
        /// LED off.
        Off = 0x02 => "OFF",
    }
}

wire_enum! {
    /// Weekly scheduler.
    AcScheduler, "scheduler" {
        /// Scheduler on.
        On = 0x01 => "ON",
        /// Scheduler off.
        Off = 0x02 => "OFF",
    }
}

wire_enum! {
    /// Error code reported by the unit.
    AcError, "error" {
        /// No error (legacy code).
        Ok0 = 0x00 => "OK_0",
        /// No error.
        Ok = 0xFE => "OK",
        /// Communication fault.
        FaultCom = 0x01 => "FAULT_COM",
        /// Outdoor controller fault.
        FaultCtrlOuter = 0x02 => "FAULT_CTRL_OUTER",
        /// Other outdoor fault.
        FaultOtherOuter = 0x03 => "FAULT_OTHER_OUTER",
        /// Indoor serial fault.
        FaultSerialInner = 0x04 => "FAULT_SERIAL_INNER",
        /// Compressor open circuit.
        FaultCompOpen = 0x07 => "FAULT_COMP_OPEN",
        /// TA sensor open circuit.
        FaultTaOc = 0x0C => "FAULT_TA_OC",
        /// TC sensor open circuit.
        FaultTcOc = 0x0D => "FAULT_TC_OC",
        /// TCJ sensor open circuit.
        FaultTcjOc = 0x0F => "FAULT_TCJ_OC",
        /// Indoor fan blocked.
        FaultFanInBlock = 0x11 => "FAULT_FAN_IN_BLOCK",
        /// Indoor controller fault.
        FaultCtrlIn = 0x12 => "FAULT_CTRL_IN",
        /// Inverter over-current.
        FaultInvtOvercur = 0x14 => "FAULT_INVT_OVERCUR",
        /// Compressor short circuit.
        FaultCompSc = 0x16 => "FAULT_COMP_SC",
        /// Outdoor controller over-current.
        FaultCtrlOutOvercur = 0x17 => "FAULT_CTRL_OUT_OVERCUR",
        /// TE/TS sensor open circuit.
        FaultTeTsOc = 0x18 => "FAULT_TE_TS_OC",
        /// TD sensor open circuit.
        FaultTdOc = 0x19 => "FAULT_TD_OC",
        /// Outdoor fan blocked.
        FaultFanOutBlock = 0x1A => "FAULT_FAN_OUT_BLOCK",
        /// TE sensor fault.
        FaultTe = 0x1B => "FAULT_TE",
        /// Compressor blocked.
        FaultCompBlock = 0x1C => "FAULT_COMP_BLOCK",
        /// Compressor phase fault.
        FaultCompPhase = 0x1D => "FAULT_COMP_PHASE",
        /// Compressor temperature above 117 °C.
        FaultTempComp117 = 0x1E => "FAULT_TEMP_COMP_117",
        /// Compressor voltage fault.
        FaultCompVolt = 0x1F => "FAULT_COMP_VOLT",
        /// High pressure.
        FaultHighPres = 0x21 => "FAULT_HIGH_PRES",
        /// State fault.
        FaultState = 0x34 => "FAULT_STATE",
        /// Description fault.
        FaultDescription = 0x35 => "FAULT_DESCRPTION",
    }
}

impl AcError {
    /// Returns `true` if the code reports a working unit.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok | Self::Ok0)
    }
}
