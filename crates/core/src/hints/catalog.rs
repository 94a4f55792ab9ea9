use std::fmt;

use super::{validate, Hint, HintInfo, HintValue, ValueKind};

/// Declares flag hints as unit structs and enumerated hints as enums, and
/// collects all of them into [`CATALOG`].
macro_rules! declare_hints {
    (
        flags {
            $(
                $(#[$flag_meta:meta])*
                $flag:ident: $value:ty = $flag_name:literal;
            )*
        }
        choices {
            $(
                $(#[$choice_meta:meta])*
                $choice:ident = $choice_name:literal {
                    $($variant:ident => $text:literal),+ $(,)?
                }
            )*
        }
    ) => {
        $(
            $(#[$flag_meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $flag;

            impl Hint for $flag {
                const NAME: &'static str = $flag_name;
                type Value = $value;
            }
        )*

        $(
            $(#[$choice_meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $choice {
                $($variant),+
            }

            impl $choice {
                /// Canonical encodings, in declaration order.
                pub const CHOICES: &'static [&'static str] = &[$($text),+];

                pub fn as_str(self) -> &'static str {
                    match self {
                        $(Self::$variant => $text),+
                    }
                }
            }

            impl fmt::Display for $choice {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl HintValue for $choice {
                const KIND: ValueKind = ValueKind::Enum;

                fn encode(&self) -> String {
                    self.as_str().to_owned()
                }

                fn decode(raw: &str) -> std::result::Result<Self, String> {
                    match raw {
                        $($text => Ok(Self::$variant),)+
                        _ => Err(format!("expected one of: {}", Self::CHOICES.join(", "))),
                    }
                }
            }

            impl Hint for $choice {
                const NAME: &'static str = $choice_name;
                type Value = Self;
            }
        )*

        /// Every hint declared by this crate.
        pub static CATALOG: &[HintInfo] = &[
            $(
                HintInfo {
                    name: $flag_name,
                    kind: <$value as HintValue>::KIND,
                    choices: &[],
                    validate: validate::<$flag>,
                },
            )*
            $(
                HintInfo {
                    name: $choice_name,
                    kind: ValueKind::Enum,
                    choices: $choice::CHOICES,
                    validate: validate::<$choice>,
                },
            )*
        ];
    };
}

declare_hints! {
    flags {
        /// Lists the accelerometer as a joystick.
        AccelerometerAsJoystick: bool = "SDL_ACCELEROMETER_AS_JOYSTICK";
        AllowTopMost: bool = "SDL_ALLOW_TOPMOST";
        AllowScreensaver: bool = "SDL_VIDEO_ALLOW_SCREENSAVER";
        AndroidBlockOnPause: bool = "SDL_ANDROID_BLOCK_ON_PAUSE";
        AndroidTrapBackButton: bool = "SDL_ANDROID_TRAP_BACK_BUTTON";
        AppleTvControllerUiEvents: bool = "SDL_APPLE_TV_CONTROLLER_UI_EVENTS";
        AppleTvRemoteAllowRotation: bool = "SDL_APPLE_TV_REMOTE_ALLOW_ROTATION";
        /// Saves BMP files without the version 4 header.
        BmpSaveLegacyFormat: bool = "SDL_BMP_SAVE_LEGACY_FORMAT";
        DisableHighDpi: bool = "SDL_VIDEO_HIGHDPI_DISABLED";
        DoubleBuffer: bool = "SDL_VIDEO_DOUBLE_BUFFER";
        EnableSteamControllers: bool = "SDL_ENABLE_STEAM_CONTROLLERS";
        /// Synchronizes presentation with the display refresh.
        EnableVSync: bool = "SDL_RENDER_VSYNC";
        GrabKeyboard: bool = "SDL_GRAB_KEYBOARD";
        IdleTimerDisabled: bool = "SDL_IOS_IDLE_TIMER_DISABLED";
        JoystickAllowBackgroundEvents: bool = "SDL_JOYSTICK_ALLOW_BACKGROUND_EVENTS";
        MinimizeOnFocusLoss: bool = "SDL_VIDEO_MINIMIZE_ON_FOCUS_LOSS";
        MouseFocusClickthrough: bool = "SDL_MOUSE_FOCUS_CLICKTHROUGH";
        MouseRelativeModeWarp: bool = "SDL_MOUSE_RELATIVE_MODE_WARP";
        MouseTouchEvents: bool = "SDL_MOUSE_TOUCH_EVENTS";
        NoSignalHandlers: bool = "SDL_NO_SIGNAL_HANDLERS";
        /// Lets the renderer batch draw calls.
        RenderBatching: bool = "SDL_RENDER_BATCHING";
        TouchMouseEvents: bool = "SDL_TOUCH_MOUSE_EVENTS";
        XinputEnabled: bool = "SDL_XINPUT_ENABLED";

        AndroidApkExpansionMainFileVersion: i32 = "SDL_ANDROID_APK_EXPANSION_MAIN_FILE_VERSION";
        AndroidApkExpansionPatchFileVersion: i32 = "SDL_ANDROID_APK_EXPANSION_PATCH_FILE_VERSION";
        /// Event logging verbosity, 0 disables logging.
        EventLogging: i32 = "SDL_EVENT_LOGGING";
        MouseDoubleClickRadius: i32 = "SDL_MOUSE_DOUBLE_CLICK_RADIUS";
        MouseDoubleClickTime: i32 = "SDL_MOUSE_DOUBLE_CLICK_TIME";

        /// Stack size of threads created by the library, 0 for the default.
        ThreadStackSize: u32 = "SDL_THREAD_STACK_SIZE";
        TimerResolution: u32 = "SDL_TIMER_RESOLUTION";

        MouseNormalSpeedScale: f32 = "SDL_MOUSE_NORMAL_SPEED_SCALE";
        MouseRelativeSpeedScale: f32 = "SDL_MOUSE_RELATIVE_SPEED_SCALE";

        /// Usable display bounds as `"x, y, w, h"`.
        DisplayUsableBounds: String = "SDL_DISPLAY_USABLE_BOUNDS";
        EmscriptenKeyboardElement: String = "SDL_EMSCRIPTEN_KEYBOARD_ELEMENT";
        GameControllerConfig: String = "SDL_GAMECONTROLLERCONFIG";
        GameControllerConfigFile: String = "SDL_GAMECONTROLLERCONFIG_FILE";
        GameControllerIgnoreDevices: String = "SDL_GAMECONTROLLER_IGNORE_DEVICES";
        WinRtPrivacyPolicyLabel: String = "SDL_WINRT_PRIVACY_POLICY_LABEL";
        WinRtPrivacyPolicyUrl: String = "SDL_WINRT_PRIVACY_POLICY_URL";
    }
    choices {
        /// Rendering backend requested when a renderer is created.
        RenderDriver = "SDL_RENDER_DRIVER" {
            Direct3D => "direct3d",
            OpenGl => "opengl",
            OpenGles => "opengles",
            OpenGles2 => "opengles2",
            Metal => "metal",
            Software => "software",
        }
        FramebufferAcceleration = "SDL_FRAMEBUFFER_ACCELERATION" {
            Off => "0",
            On => "1",
            OpenGl => "opengl",
            OpenGles => "opengles",
            OpenGles2 => "opengles2",
            Direct3D => "direct3d",
            Metal => "metal",
            Software => "software",
        }
        AudioResamplingMode = "SDL_AUDIO_RESAMPLING_MODE" {
            Default => "default",
            Fast => "fast",
            Medium => "medium",
            Best => "best",
        }
        AudioCategory = "SDL_AUDIOCATEGORY" {
            Ambient => "ambient",
            Playback => "playback",
        }
        /// Texture filtering used when scaling.
        ScaleQuality = "SDL_RENDER_SCALE_QUALITY" {
            Nearest => "nearest",
            Linear => "linear",
            Best => "best",
        }
        LogicalSizeMode = "SDL_RENDER_LOGICAL_SIZE_MODE" {
            Letterbox => "letterbox",
            Overscan => "overscan",
        }
        WaveRiffChunkSize = "SDL_WAVE_RIFF_CHUNK_SIZE" {
            Force => "force",
            IgnoreZero => "ignorezero",
            Ignore => "ignore",
            Maximum => "maximum",
        }
        WaveTruncation = "SDL_WAVE_TRUNCATION" {
            VeryStrict => "verystrict",
            Strict => "strict",
            DropFrame => "dropframe",
            DropBlock => "dropblock",
        }
        WaveFactChunk = "SDL_WAVE_FACT_CHUNK" {
            Truncate => "truncate",
            Strict => "strict",
            IgnoreZero => "ignorezero",
            Ignore => "ignore",
        }
    }
}
