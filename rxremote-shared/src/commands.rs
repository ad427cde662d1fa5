//! Key codes of the RX-E600 remote and the token table that names them.

use std::collections::HashMap;

/// Custom code of the RX-E600 remote, sent in the NEC address slot
pub const CUSTOM_CODE: u8 = 0x78;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Button {
    Power,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Mode10,
    Start100,
    RepeatA,
    RandomB,
    ProgC,
    DKey,
    Pause,
    Time,
    Play,
    Rewind,
    Stop,
    FastForward,
    TapeDir,
    PresetDown,
    Tuner,
    PresetUp,
    Md,
    Dvd,
    Tape,
    Aux,
    MdRec,
    TapeRec,
    Mode,
    Start,
    Sleep,
    VolumeUp,
    Display,
    VolumeDown,
}

use self::Button::*;

impl Button {
    pub const ALL: &'static [Button] = &[
        Power, Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
        Mode10, Start100, RepeatA, RandomB, ProgC, DKey, Pause, Time, Play, Rewind, Stop,
        FastForward, TapeDir, PresetDown, Tuner, PresetUp, Md, Dvd, Tape, Aux, MdRec, TapeRec,
        Mode, Start, Sleep, VolumeUp, Display, VolumeDown,
    ];

    pub fn code(self) -> u8 {
        match self {
            Power => 0x0F,
            Digit0 => 0x10,
            Digit1 => 0x11,
            Digit2 => 0x12,
            Digit3 => 0x13,
            Digit4 => 0x14,
            Digit5 => 0x15,
            Digit6 => 0x16,
            Digit7 => 0x17,
            Digit8 => 0x18,
            Digit9 => 0x19,
            Mode10 => 0x1A,
            Start100 => 0x1D,
            RepeatA => 0x0C,
            RandomB => 0x07,
            ProgC => 0x0B,
            DKey => 0x09,
            Pause => 0x0A,
            Time => 0x08,
            Play => 0x02,
            Rewind => 0x04,
            Stop => 0x01,
            FastForward => 0x03,
            TapeDir => 0x43,
            PresetDown => 0x1C,
            Tuner => 0x4B,
            PresetUp => 0x1B,
            Md => 0x57,
            Dvd => 0x4A,
            Tape => 0x41,
            Aux => 0x49,
            MdRec => 0x58,
            TapeRec => 0x46,
            Mode => 0x05,
            Start => 0x06,
            Sleep => 0x4F,
            VolumeUp => 0x1E,
            Display => 0x4E,
            VolumeDown => 0x1F,
        }
    }

    /// Name used in the console echo
    pub fn label(self) -> &'static str {
        match self {
            Power => "POWER",
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            Mode10 => "+10",
            Start100 => "START/100",
            RepeatA => "REPEAT",
            RandomB => "RANDOM",
            ProgC => "PROG",
            DKey => "D KEY",
            Pause => "PAUSE",
            Time => "TIME",
            Play => "PLAY",
            Rewind => "REWIND",
            Stop => "STOP",
            FastForward => "FAST FORWARD",
            TapeDir => "TAPE DIRECTION",
            PresetDown => "PRESET DOWN",
            Tuner => "TUNER",
            PresetUp => "PRESET UP",
            Md => "MD",
            Dvd => "DVD",
            Tape => "TAPE",
            Aux => "AUX",
            MdRec => "MD REC",
            TapeRec => "TAPE REC",
            Mode => "CD/DISC",
            Start => "START",
            Sleep => "SLEEP",
            VolumeUp => "VOLUME UP",
            Display => "DISPLAY",
            VolumeDown => "VOLUME DOWN",
        }
    }

    pub fn from_code(code: u8) -> Option<Button> {
        Button::ALL.iter().copied().find(|b| b.code() == code)
    }

    pub fn digit(n: u8) -> Option<Button> {
        match n {
            0..=9 => Button::from_code(Digit0.code() + n),
            _ => None,
        }
    }
}

/// Every accepted token. Aliases are plain extra entries.
const TOKENS: &[(&str, Button)] = &[
    ("POWER", Power),
    ("PWR", Power),
    ("VOL+", VolumeUp),
    ("VOLUP", VolumeUp),
    ("VOL_UP", VolumeUp),
    ("VOL-", VolumeDown),
    ("VOLDOWN", VolumeDown),
    ("VOL_DOWN", VolumeDown),
    ("PLAY", Play),
    ("PAUSE", Pause),
    ("STOP", Stop),
    ("FF", FastForward),
    ("FORWARD", FastForward),
    ("REW", Rewind),
    ("REWIND", Rewind),
    ("CD", Mode),
    ("DISC", Mode),
    ("MODE", Mode),
    ("TUNER", Tuner),
    ("RADIO", Tuner),
    ("TAPE", Tape),
    ("AUX", Aux),
    ("MD", Md),
    ("DVD", Dvd),
    ("DISPLAY", Display),
    ("SLEEP", Sleep),
    ("RANDOM", RandomB),
    ("RANDOM_B", RandomB),
    ("REPEAT", RepeatA),
    ("REP_A", RepeatA),
    ("0", Digit0),
    ("1", Digit1),
    ("2", Digit2),
    ("3", Digit3),
    ("4", Digit4),
    ("5", Digit5),
    ("6", Digit6),
    ("7", Digit7),
    ("8", Digit8),
    ("9", Digit9),
    ("DIGIT_0", Digit0),
    ("DIGIT_1", Digit1),
    ("DIGIT_2", Digit2),
    ("DIGIT_3", Digit3),
    ("DIGIT_4", Digit4),
    ("DIGIT_5", Digit5),
    ("DIGIT_6", Digit6),
    ("DIGIT_7", Digit7),
    ("DIGIT_8", Digit8),
    ("DIGIT_9", Digit9),
    ("MODE_10", Mode10),
    ("START_100", Start100),
    ("PROG_C", ProgC),
    ("D_KEY", DKey),
    ("TIME", Time),
    ("TAPE_DIR", TapeDir),
    ("PRESET_DN", PresetDown),
    ("PRESET_UP", PresetUp),
    ("MD_REC", MdRec),
    ("TAPE_REC", TapeRec),
    ("START", Start),
];

/// Token to button lookup, built once and never changed.
#[derive(Debug)]
pub struct CommandTable {
    map: HashMap<&'static str, Button>,
}

impl CommandTable {
    pub fn new() -> Self {
        CommandTable {
            map: TOKENS.iter().copied().collect(),
        }
    }

    /// Exact match of an already normalized token
    pub fn resolve(&self, token: &str) -> Option<Button> {
        self.map.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All tokens naming `button`
    pub fn aliases(&self, button: Button) -> Vec<&'static str> {
        TOKENS
            .iter()
            .filter(|(_, b)| *b == button)
            .map(|(token, _)| *token)
            .collect()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        CommandTable::new()
    }
}

/// Trim and upper-case an input line
pub fn normalize(line: &str) -> String {
    line.trim().to_uppercase()
}
