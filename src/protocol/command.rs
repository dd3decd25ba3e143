//! Command opcodes for the MH-Z19C protocol.
//!
//! Every request is a single opcode plus up to five parameter bytes. The
//! sensor answers some commands with a nine-byte response frame whose first
//! few data bytes carry the result.

/// Commands understood by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Set automatic baseline correction (ABC) on/off.
    SetAutoCalib = 0x79,
    /// Get automatic baseline correction (ABC) on/off.
    GetAutoCalib = 0x7D,
    /// Read temperature in hundredths of a degree (undocumented).
    ReadTemperature = 0x85,
    /// Read CO2 concentration, with an integer temperature alongside.
    ReadCo2 = 0x86,
    /// Treat the current ambient air as the zero point.
    ZeroCalibration = 0x87,
    /// Read the firmware version string.
    GetVersion = 0xA0,
}

/// Parameter byte enabling ABC in a `SetAutoCalib` request.
pub const CALIB_ON: u8 = 0xA0;

/// Parameter byte disabling ABC in a `SetAutoCalib` request.
pub const CALIB_OFF: u8 = 0x00;

impl Command {
    /// All known commands.
    pub const ALL: [Self; 6] = [
        Self::SetAutoCalib,
        Self::GetAutoCalib,
        Self::ReadTemperature,
        Self::ReadCo2,
        Self::ZeroCalibration,
        Self::GetVersion,
    ];

    /// Returns the opcode byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Looks up a command by opcode.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0x79 => Some(Self::SetAutoCalib),
            0x7D => Some(Self::GetAutoCalib),
            0x85 => Some(Self::ReadTemperature),
            0x86 => Some(Self::ReadCo2),
            0x87 => Some(Self::ZeroCalibration),
            0xA0 => Some(Self::GetVersion),
            _ => None,
        }
    }

    /// Number of response data bytes this command interprets.
    #[must_use]
    pub const fn response_width(self) -> usize {
        match self {
            Self::ReadCo2 => 3,
            Self::ReadTemperature | Self::GetVersion => 4,
            Self::GetAutoCalib => 6,
            Self::SetAutoCalib | Self::ZeroCalibration => 0,
        }
    }

    /// Returns true if the sensor answers this command with a frame.
    ///
    /// Set commands are write-only; the sensor never replies to them.
    #[must_use]
    pub const fn expects_response(self) -> bool {
        self.response_width() > 0
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> Self {
        cmd as Self
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        Self::from_opcode(opcode).ok_or(opcode)
    }
}
