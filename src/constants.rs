use phf::phf_map;
use std::time::Duration;

pub const CONTROL_PORT: u16 = 443;
pub const RTSP_PORT: u16 = 554;
pub const DEFAULT_STREAM_PATH: &str = "stream1";

/// Storage slots the firmware reserves for user-uploaded alarm audio.
pub const CUSTOM_AUDIO_SLOTS: &[u32] = &[101, 102, 103];

/// Built-in speaker sounds (0 = siren, 1 = doorbell, the rest vary by model).
pub const BUILTIN_SOUND_MIN: u32 = 0;
pub const BUILTIN_SOUND_MAX: u32 = 9;

pub const MIN_VOLUME: u8 = 1;
pub const MAX_VOLUME: u8 = 100;

/// Fixed prefix the firmware prepends to the password before MD5 hashing.
pub const PASSWORD_HASH_PREFIX: &str = "TPCQ75NF2Y:";

/// Largest custom audio payload the camera accepts.
pub const MAX_AUDIO_BYTES: usize = 128 * 1024;

/// G.711 at 8 kHz mono is one byte per sample.
pub const G711_BYTES_PER_SECOND: usize = 8000;

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(15);

pub static CODES: phf::Map<i32, &'static str> = phf_map! {
    -40101i32 => "Parameter not valid",
    -40105i32 => "Method does not exist",
    -40106i32 => "Parameter to get/do does not exist",
    -40209i32 => "Invalid login credentials",
    -40210i32 => "Function not supported",
    -40401i32 => "Invalid stok value",
    -64303i32 => "Action cannot be done while camera is in patrol mode",
    -64304i32 => "Maximum controlling streams limit reached",
    -64324i32 => "Privacy mode is on, not able to execute",
    -71103i32 => "User does not exist",
    -71112i32 => "User and password do not match",
};

pub fn describe_error_code(code: i64) -> &'static str {
    i32::try_from(code)
        .ok()
        .and_then(|c| CODES.get(&c).copied())
        .unwrap_or("Unknown error")
}

pub fn is_custom_audio_slot(id: u32) -> bool {
    CUSTOM_AUDIO_SLOTS.contains(&id)
}

pub fn is_known_sound_id(id: u32) -> bool {
    (BUILTIN_SOUND_MIN..=BUILTIN_SOUND_MAX).contains(&id) || is_custom_audio_slot(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_described() {
        assert_eq!(describe_error_code(-40401), "Invalid stok value");
        assert_eq!(describe_error_code(-40209), "Invalid login credentials");
        assert_eq!(describe_error_code(12345), "Unknown error");
        assert_eq!(describe_error_code(i64::MIN), "Unknown error");
    }

    #[test]
    fn sound_id_ranges() {
        assert!(is_known_sound_id(0));
        assert!(is_known_sound_id(9));
        assert!(is_known_sound_id(101));
        assert!(is_known_sound_id(103));
        assert!(!is_known_sound_id(10));
        assert!(!is_known_sound_id(100));
        assert!(!is_known_sound_id(104));
    }

    #[test]
    fn slot_ids() {
        for slot in [101, 102, 103] {
            assert!(is_custom_audio_slot(slot));
        }
        assert!(!is_custom_audio_slot(104));
    }
}
