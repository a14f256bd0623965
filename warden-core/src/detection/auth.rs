//! Session metadata cross-validation, run once when the player joins.
//!
//! Spoofed-edition clients advertise one platform in the connection request
//! and another in the store title id they authenticated with. The mapping is
//! fixed per platform, so a mismatch is conclusive.

use phf::phf_map;

use crate::config::Thresholds;
use crate::detection::{Detection, DetectionCtx, DetectionKind, DetectionState};
use crate::interface::{DeviceOs, InputMode, SessionInfo};

/// Store title id each platform's client authenticates with.
static TITLE_IDS: phf::Map<u8, &'static str> = phf_map! {
    0u8 => "1739947436",  // Android
    1u8 => "1810924247",  // iOS
    2u8 => "1944307183",  // macOS
    3u8 => "1739947436",  // FireOS ships the Android build
    4u8 => "896928775",   // Windows
    7u8 => "1810924247",  // tvOS ships the iOS build
    8u8 => "2044456598",  // PlayStation
    9u8 => "2047319603",  // Nintendo
    10u8 => "1828326430", // Xbox
};

/// Android's store title id, legitimate on consoles running the mobile build.
const ANDROID_TITLE_ID: &str = "1739947436";

const fn os_key(os: DeviceOs) -> u8 {
    match os {
        DeviceOs::Android => 0,
        DeviceOs::Ios => 1,
        DeviceOs::Osx => 2,
        DeviceOs::FireOs => 3,
        DeviceOs::Windows => 4,
        DeviceOs::Win32 => 5,
        DeviceOs::Dedicated => 6,
        DeviceOs::TvOs => 7,
        DeviceOs::PlayStation => 8,
        DeviceOs::Nintendo => 9,
        DeviceOs::Xbox => 10,
        DeviceOs::Unknown => 255,
    }
}

/// Title-id / platform cross-check.
#[derive(Debug)]
pub struct EditionFakerA {
    state: DetectionState,
}

impl EditionFakerA {
    /// Builds the detector with instant thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DetectionState::new(Thresholds::instant()),
        }
    }

    /// Validates the session's title id against its platform. Platforms with
    /// no known mapping are skipped rather than flagged; consoles presenting
    /// the Android title id are running the sideloaded mobile build, which
    /// is unusual but not spoofed.
    pub fn on_join(&mut self, ctx: &mut DetectionCtx<'_>, session: &SessionInfo) {
        let Some(&expected) = TITLE_IDS.get(&os_key(session.device_os)) else {
            return;
        };
        if session.title_id == expected {
            return;
        }
        if matches!(session.device_os, DeviceOs::Xbox | DeviceOs::PlayStation)
            && session.title_id == ANDROID_TITLE_ID
        {
            return;
        }

        let debug = vec![
            ("os", format!("{:?}", session.device_os)),
            ("title_id", session.title_id.clone()),
            ("expected", expected.to_owned()),
        ];
        ctx.flag(self, 1.0, debug);
    }
}

impl Default for EditionFakerA {
    fn default() -> Self {
        Self::new()
    }
}

impl Detection for EditionFakerA {
    fn name(&self) -> &'static str {
        "EditionFakerA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Auth
    }

    fn state(&self) -> &DetectionState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DetectionState {
        &mut self.state
    }
}

/// Input-mode / platform plausibility check.
#[derive(Debug)]
pub struct EditionFakerB {
    state: DetectionState,
}

impl EditionFakerB {
    /// Builds the detector with instant thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DetectionState::new(Thresholds::instant()),
        }
    }

    /// Flags input modes the platform's hardware cannot produce. Kept
    /// deliberately narrow: most platforms accept external peripherals, so
    /// only hard impossibilities count.
    pub fn on_input_mode(&mut self, ctx: &mut DetectionCtx<'_>, session: &SessionInfo) {
        let impossible = match session.device_os {
            // Consoles have no touch screen; the Switch has one.
            DeviceOs::Xbox | DeviceOs::PlayStation => session.input_mode == InputMode::Touch,
            // tvOS has neither touch input nor mouse support.
            DeviceOs::TvOs => {
                matches!(session.input_mode, InputMode::Touch | InputMode::Mouse)
            }
            _ => false,
        };

        if impossible {
            let debug = vec![
                ("os", format!("{:?}", session.device_os)),
                ("input_mode", format!("{:?}", session.input_mode)),
            ];
            ctx.flag(self, 1.0, debug);
        }
    }
}

impl Default for EditionFakerB {
    fn default() -> Self {
        Self::new()
    }
}

impl Detection for EditionFakerB {
    fn name(&self) -> &'static str {
        "EditionFakerB"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Auth
    }

    fn state(&self) -> &DetectionState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DetectionState {
        &mut self.state
    }
}
