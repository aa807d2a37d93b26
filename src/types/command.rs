/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

/// Host to bootloader command codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    GetVersion,
    GetHelp,
    GetChipId,
    RdpStatus,
    GoToAddress,
    FlashErase,
    MemoryWrite,
    EnableRwProtect,
    MemoryRead,
    ReadSectorStatus,
    OtpRead,
    DisableWriteProtect,
    /// Anything outside `0x51..=0x5C`
    Unknown(u8),
}

impl Command {
    pub const GET_VER: u8 = 0x51;
    pub const GET_HELP: u8 = 0x52;
    pub const GET_CID: u8 = 0x53;
    pub const RDP_STATUS: u8 = 0x54;
    pub const GO_TO_ADDR: u8 = 0x55;
    pub const FLASH_ERASE: u8 = 0x56;
    pub const MEM_WRITE: u8 = 0x57;
    pub const EN_RW_PROTECT: u8 = 0x58;
    pub const MEM_READ: u8 = 0x59;
    pub const READ_SECTOR_STATUS: u8 = 0x5A;
    pub const OTP_READ: u8 = 0x5B;
    pub const DIS_WR_PROTECTION: u8 = 0x5C;

    /// Every known command, in GET_HELP order
    pub const SUPPORTED: [Command; 12] = [
        Self::GetVersion,
        Self::GetHelp,
        Self::GetChipId,
        Self::RdpStatus,
        Self::GoToAddress,
        Self::FlashErase,
        Self::MemoryWrite,
        Self::EnableRwProtect,
        Self::MemoryRead,
        Self::ReadSectorStatus,
        Self::OtpRead,
        Self::DisableWriteProtect,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Self::GetVersion => Self::GET_VER,
            Self::GetHelp => Self::GET_HELP,
            Self::GetChipId => Self::GET_CID,
            Self::RdpStatus => Self::RDP_STATUS,
            Self::GoToAddress => Self::GO_TO_ADDR,
            Self::FlashErase => Self::FLASH_ERASE,
            Self::MemoryWrite => Self::MEM_WRITE,
            Self::EnableRwProtect => Self::EN_RW_PROTECT,
            Self::MemoryRead => Self::MEM_READ,
            Self::ReadSectorStatus => Self::READ_SECTOR_STATUS,
            Self::OtpRead => Self::OTP_READ,
            Self::DisableWriteProtect => Self::DIS_WR_PROTECTION,
            Self::Unknown(code) => code,
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Reply payload of GET_HELP
    pub const fn supported_codes() -> [u8; 12] {
        let mut codes = [0u8; 12];
        let mut i = 0;
        while i < codes.len() {
            codes[i] = Self::SUPPORTED[i].code();
            i += 1;
        }
        codes
    }
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        match value {
            Self::GET_VER => Self::GetVersion,
            Self::GET_HELP => Self::GetHelp,
            Self::GET_CID => Self::GetChipId,
            Self::RDP_STATUS => Self::RdpStatus,
            Self::GO_TO_ADDR => Self::GoToAddress,
            Self::FLASH_ERASE => Self::FlashErase,
            Self::MEM_WRITE => Self::MemoryWrite,
            Self::EN_RW_PROTECT => Self::EnableRwProtect,
            Self::MEM_READ => Self::MemoryRead,
            Self::READ_SECTOR_STATUS => Self::ReadSectorStatus,
            Self::OTP_READ => Self::OtpRead,
            Self::DIS_WR_PROTECTION => Self::DisableWriteProtect,
            other => Self::Unknown(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value.code()
    }
}
