//! Telegram WebApp host bridge
//!
//! Everything goes through `window.Telegram.WebApp` looked up at call time;
//! outside Telegram (plain browser, native) the calls do nothing.

use crate::bridge::Haptic;

/// What the hosting page offers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Running inside a Telegram Mini App
    pub telegram: bool,
    pub haptics: bool,
    /// Telegram username, or first name when there is none
    pub username: Option<String>,
}

/// `(method, argument)` pair for a haptic request
pub fn haptic_call(kind: Haptic) -> (&'static str, &'static str) {
    match kind {
        Haptic::Light => ("impactOccurred", "light"),
        Haptic::Success => ("notificationOccurred", "success"),
        Haptic::Error => ("notificationOccurred", "error"),
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use js_sys::{Function, Reflect};
    use wasm_bindgen::{JsCast, JsValue};

    use super::{HostCapabilities, haptic_call};
    use crate::bridge::Haptic;

    fn get(target: &JsValue, key: &str) -> Option<JsValue> {
        let value = Reflect::get(target, &JsValue::from_str(key)).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    fn web_app() -> Option<JsValue> {
        let window: JsValue = web_sys::window()?.into();
        get(&get(&window, "Telegram")?, "WebApp")
    }

    fn call(target: &JsValue, method: &str, args: &[&str]) -> bool {
        let Some(func) = get(target, method).and_then(|f| f.dyn_into::<Function>().ok()) else {
            return false;
        };
        let result = match args {
            [] => func.call0(target),
            [a] => func.call1(target, &JsValue::from_str(a)),
            _ => return false,
        };
        result.is_ok()
    }

    pub fn probe() -> HostCapabilities {
        let Some(app) = web_app() else {
            return HostCapabilities::default();
        };
        let user = get(&app, "initDataUnsafe").and_then(|data| get(&data, "user"));
        let username = user.and_then(|u| {
            ["username", "first_name"]
                .iter()
                .find_map(|key| get(&u, key).and_then(|v| v.as_string()))
                .filter(|name| !name.is_empty())
        });
        HostCapabilities {
            telegram: true,
            haptics: get(&app, "HapticFeedback").is_some(),
            username,
        }
    }

    pub fn init() -> HostCapabilities {
        let caps = probe();
        match web_app() {
            Some(app) => {
                call(&app, "ready", &[]);
                call(&app, "expand", &[]);
                log::info!("Telegram WebApp initialized (user {:?})", caps.username);
            }
            None => log::warn!("Telegram WebApp not found, running in browser mode"),
        }
        caps
    }

    pub fn haptic(kind: Haptic) {
        let Some(feedback) = web_app().and_then(|app| get(&app, "HapticFeedback")) else {
            return;
        };
        let (method, arg) = haptic_call(kind);
        call(&feedback, method, &[arg]);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{haptic, init, probe};

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn probe() -> HostCapabilities {
    HostCapabilities::default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> HostCapabilities {
    log::debug!("No Telegram host on native");
    HostCapabilities::default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn haptic(kind: Haptic) {
    log::trace!("haptic {:?}", haptic_call(kind));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haptic_mapping() {
        assert_eq!(haptic_call(Haptic::Light), ("impactOccurred", "light"));
        assert_eq!(haptic_call(Haptic::Error), ("notificationOccurred", "error"));
    }

    #[test]
    fn test_native_has_no_host() {
        let caps = init();
        assert!(!caps.telegram);
        assert!(!caps.haptics);
        haptic(Haptic::Success);
    }
}
