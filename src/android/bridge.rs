//! JNI function exports for Android integration
//!
//! An on-device service pushes screen frames in and gets back a packed
//! action describing the press to perform.

use jni::objects::{JByteArray, JClass, JObject, JString};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use crate::config::Settings;
use crate::game::Swipe;
use crate::{get_jumper, init_jumper, JumpAction};

/// Initialize the jump engine
///
/// Called once when the Android service starts. A missing or malformed
/// config falls back to defaults.
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_init<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    config_json: JString<'local>,
) -> jboolean {
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("AutoJump"),
    );

    log::info!("Initializing jump engine");

    let settings = if config_json.is_null() {
        Settings::default()
    } else {
        match env.get_string(&config_json) {
            Ok(config_str) => {
                let config: String = config_str.into();
                Settings::from_json(&config).unwrap_or_else(|e| {
                    log::warn!("Invalid config, using defaults: {}", e);
                    Settings::default()
                })
            }
            Err(e) => {
                log::error!("Failed to get config string: {}", e);
                Settings::default()
            }
        }
    };

    init_jumper(settings);
    JNI_TRUE
}

/// Process a screen frame and get the next action
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_processFrame<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
) -> jlong {
    let Some(jumper) = get_jumper() else {
        log::error!("Jump engine not initialized");
        return 0;
    };
    if width <= 0 || height <= 0 {
        log::error!("Invalid frame size {}x{}", width, height);
        return 0;
    }

    let frame_bytes = match env.convert_byte_array(frame_data) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to convert frame data: {}", e);
            return 0;
        }
    };

    let mut jumper = match jumper.lock() {
        Ok(j) => j,
        Err(e) => {
            log::error!("Failed to lock jump engine: {}", e);
            return 0;
        }
    };

    let action = jumper.process_frame(&frame_bytes, width as u32, height as u32);
    encode_action(&action)
}

/// Delay the service should wait before sending the next frame (ms)
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_nextDelay<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jlong {
    get_jumper()
        .and_then(|jumper| jumper.lock().ok())
        .map(|mut jumper| jumper.next_delay_ms() as jlong)
        .unwrap_or(0)
}

/// Session counters as JSON
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_getSessionStats<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> JString<'local> {
    let json = get_jumper()
        .and_then(|jumper| jumper.lock().ok())
        .and_then(|jumper| serde_json::to_string(&jumper.game_state).ok())
        .unwrap_or_else(|| "{}".to_string());

    match env.new_string(json) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to create session stats string: {}", e);
            JObject::null().into()
        }
    }
}

/// Replace settings, keeping session counters
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_updateSettings<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    settings_json: JString<'local>,
) -> jboolean {
    let Some(jumper) = get_jumper() else {
        return JNI_FALSE;
    };

    let settings_str: String = match env.get_string(&settings_json) {
        Ok(s) => s.into(),
        Err(_) => return JNI_FALSE,
    };

    let settings = match Settings::from_json(&settings_str) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to parse settings: {}", e);
            return JNI_FALSE;
        }
    };

    let mut jumper = match jumper.lock() {
        Ok(j) => j,
        Err(_) => return JNI_FALSE,
    };

    jumper.update_settings(settings);
    JNI_TRUE
}

/// Pause/resume automation
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_setPaused<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    paused: jboolean,
) {
    let Some(jumper) = get_jumper() else {
        return;
    };

    let mut jumper = match jumper.lock() {
        Ok(j) => j,
        Err(_) => return,
    };

    if paused != 0 {
        jumper.game_state.pause();
    } else {
        jumper.game_state.resume();
    }
}

/// Get the action type from an encoded action
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_getActionType<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    action_code: jlong,
) -> jint {
    action_type(action_code)
}

/// Get the press X coordinate
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_getActionX<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    action_code: jlong,
) -> jint {
    action_x(action_code)
}

/// Get the press Y coordinate
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_getActionY<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    action_code: jlong,
) -> jint {
    action_y(action_code)
}

/// Get the press or wait duration (ms)
#[no_mangle]
pub extern "system" fn Java_io_autojump_AutoJumpCore_getActionDuration<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    action_code: jlong,
) -> jint {
    action_duration(action_code)
}

const COORD_MASK: i64 = 0xFFFF;
const DURATION_MASK: i64 = 0xFF_FFFF;

/// Encode a JumpAction into a long for JNI transfer
///
/// Format (64 bits):
/// - Bits 56-63: Action type (8 bits)
/// - Bits 40-55: X coordinate (16 bits)
/// - Bits 24-39: Y coordinate (16 bits)
/// - Bits 0-23: Duration in ms (24 bits)
///
/// Presses hold in place, so only the start point is sent.
pub fn encode_action(action: &JumpAction) -> jlong {
    match action {
        JumpAction::None => 0,

        JumpAction::Swipe(Swipe {
            start_x,
            start_y,
            duration_ms,
            ..
        }) => {
            let kind = action_types::SWIPE as i64;
            (kind << 56)
                | (((*start_x).max(0) as i64 & COORD_MASK) << 40)
                | (((*start_y).max(0) as i64 & COORD_MASK) << 24)
                | (*duration_ms as i64).min(DURATION_MASK)
        }

        JumpAction::Wait { duration_ms } => {
            let kind = action_types::WAIT as i64;
            (kind << 56) | (*duration_ms as i64).min(DURATION_MASK)
        }
    }
}

fn action_type(code: jlong) -> jint {
    ((code >> 56) & 0xFF) as jint
}

fn action_x(code: jlong) -> jint {
    ((code >> 40) & COORD_MASK) as jint
}

fn action_y(code: jlong) -> jint {
    ((code >> 24) & COORD_MASK) as jint
}

fn action_duration(code: jlong) -> jint {
    (code & DURATION_MASK) as jint
}

/// Action type constants (must match Kotlin side)
pub mod action_types {
    pub const NONE: i32 = 0;
    pub const SWIPE: i32 = 1;
    pub const WAIT: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_none() {
        let code = encode_action(&JumpAction::None);
        assert_eq!(code, 0);
        assert_eq!(action_type(code), action_types::NONE);
    }

    #[test]
    fn test_encode_swipe() {
        let code = encode_action(&JumpAction::Swipe(Swipe::hold(540, 1584, 612)));

        assert_eq!(action_type(code), action_types::SWIPE);
        assert_eq!(action_x(code), 540);
        assert_eq!(action_y(code), 1584);
        assert_eq!(action_duration(code), 612);
    }

    #[test]
    fn test_encode_wait() {
        let code = encode_action(&JumpAction::Wait {
            duration_ms: 45_000,
        });

        assert_eq!(action_type(code), action_types::WAIT);
        assert_eq!(action_x(code), 0);
        assert_eq!(action_y(code), 0);
        assert_eq!(action_duration(code), 45_000);
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        let code = encode_action(&JumpAction::Swipe(Swipe::hold(-5, 1584, u32::MAX)));

        assert_eq!(action_type(code), action_types::SWIPE);
        assert_eq!(action_x(code), 0);
        assert_eq!(action_duration(code), 0xFF_FFFF);
    }
}
