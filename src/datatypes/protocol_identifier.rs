// ABOUTME: Protocol identifier octet flags (plain short message, telematic interworking, replace types)
// ABOUTME: Codes are matched exactly, unknown or reserved codes resolve to an empty set

use super::FlagSet;
use crate::macros::binary_flags;

binary_flags! {
    pub enum ProtocolIdentifier {
        ShortMessage = (0x00, 0xFF),
        TelematicImplicit = (0x20, 0xFF),
        TelematicTelex = (0x21, 0xFF),
        TelematicTelefaxGroup3 = (0x22, 0xFF),
        TelematicTelefaxGroup4 = (0x23, 0xFF),
        TelematicVoice = (0x24, 0xFF),
        TelematicErmes = (0x25, 0xFF),
        TelematicNationalPaging = (0x26, 0xFF),
        TelematicVideotex = (0x27, 0xFF),
        TelematicTeletexUnspecified = (0x28, 0xFF),
        TelematicTeletexPspdn = (0x29, 0xFF),
        TelematicTeletexCspdn = (0x2A, 0xFF),
        TelematicTeletexPstn = (0x2B, 0xFF),
        TelematicTeletexIsdn = (0x2C, 0xFF),
        TelematicUci = (0x2D, 0xFF),
        KnownMessageHandlingFacility = (0x30, 0xFF),
        X400 = (0x31, 0xFF),
        InternetEmail = (0x32, 0xFF),
        GsmMobileStation = (0x3F, 0xFF),
        ShortMessageType0 = (0x40, 0xFF),
        ReplaceShortMessageType1 = (0x41, 0xFF),
        ReplaceShortMessageType2 = (0x42, 0xFF),
        ReplaceShortMessageType3 = (0x43, 0xFF),
        ReplaceShortMessageType4 = (0x44, 0xFF),
        ReplaceShortMessageType5 = (0x45, 0xFF),
        ReplaceShortMessageType6 = (0x46, 0xFF),
        ReplaceShortMessageType7 = (0x47, 0xFF),
        ReturnCallMessage = (0x5F, 0xFF),
        SimDataDownload = (0x7F, 0xFF),
    }
}

impl ProtocolIdentifier {
    /// The identifier for an ordinary text message
    pub fn short_message() -> FlagSet<ProtocolIdentifier> {
        FlagSet::from([ProtocolIdentifier::ShortMessage])
    }
}
