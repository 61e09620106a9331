//! Host-side bridge exposed to page script.
//!
//! At each document's script-injection point the platform layer installs one
//! host object under [`BRIDGE_GLOBAL`] on the page's global scope. Page
//! script calls `invoke`/`emit` on it; the calls arrive here as JSON
//! messages and are dispatched to the application's [`BridgeHandler`].
//! `invoke` returns a Promise on the page side: each call carries a
//! `callId`, and [`dispatch`] hands back a reply script that settles the
//! matching Promise when the platform evaluates it in the page.

use serde::Deserialize;

/// Global property name under which the bridge object is installed
/// (`window.backend` from page script).
pub const BRIDGE_GLOBAL: &str = "backend";

/// Handler for bridge calls from JavaScript.
///
/// Implement this to service `window.backend.invoke()` calls and
/// `window.backend.emit()` events. Called from the engine's delivery
/// context, never the UI thread; implementations must not perform UI work.
pub trait BridgeHandler: Send + Sync {
    /// Handle an invoke call from JavaScript.
    ///
    /// Return `Ok(value)` to resolve the JS Promise.
    /// Return `Err(message)` to reject the JS Promise.
    fn on_invoke(
        &self,
        _method: &str,
        _args: &[serde_json::Value],
    ) -> Result<serde_json::Value, String> {
        Ok(serde_json::Value::Null)
    }

    /// Handle a fire-and-forget event from JavaScript.
    fn on_event(&self, _name: &str, _data: &serde_json::Value) {}
}

/// A message posted by the injected bridge object.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BridgeMessage {
    /// `window.backend.invoke(method, ...args)`
    Invoke {
        #[serde(rename = "callId", default)]
        call_id: u64,
        method: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
    /// `window.backend.emit(name, data)`
    Event {
        name: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// Parse a raw bridge message and dispatch it to `handler`.
///
/// For an invoke, returns the reply script that settles the page-side
/// Promise; the platform evaluates it in the originating page. Events and
/// malformed payloads return `None` — the latter are logged and dropped,
/// nothing escapes this boundary as an error.
pub fn dispatch(handler: &dyn BridgeHandler, raw: &str, global: &str) -> Option<String> {
    let message: BridgeMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(err) => {
            log::warn!("dropping malformed bridge message: {err}");
            return None;
        }
    };
    match message {
        BridgeMessage::Invoke {
            call_id,
            method,
            args,
        } => {
            let result = handler.on_invoke(&method, &args);
            if let Err(err) = &result {
                log::warn!("bridge invoke {method:?} failed: {err}");
            }
            Some(reply_script(global, call_id, result))
        }
        BridgeMessage::Event { name, data } => {
            handler.on_event(&name, &data);
            None
        }
    }
}

/// Build the script that settles an invoke's Promise: resolves with the
/// `Ok` value, rejects with the `Err` message.
fn reply_script(global: &str, call_id: u64, result: Result<serde_json::Value, String>) -> String {
    match result {
        Ok(value) => {
            let json = serde_json::to_string(&value).unwrap_or_else(|_| "null".into());
            format!("window.{global}._onResult({call_id},{{\"ok\":{json}}})")
        }
        Err(err) => {
            let escaped = serde_json::to_string(&err).unwrap_or_default();
            format!("window.{global}._onResult({call_id},{{\"err\":{escaped}}})")
        }
    }
}

/// Build the script that installs the bridge object on a document's global
/// scope. `post` is the platform's message-post expression (e.g. WebKit's
/// `window.webkit.messageHandlers.<channel>.postMessage`); it receives one
/// JSON string argument. `invoke` returns a Promise settled via `_onResult`
/// when the host's reply script runs.
pub fn bootstrap_script(global: &str, post: &str) -> String {
    format!(
        "(function() {{\n\
         \x20 if (window.{global}) {{ return; }}\n\
         \x20 var post = function(payload) {{ {post}(JSON.stringify(payload)); }};\n\
         \x20 var nextCallId = 1;\n\
         \x20 var pending = {{}};\n\
         \x20 window.{global} = {{\n\
         \x20   invoke: function(method) {{\n\
         \x20     var args = Array.prototype.slice.call(arguments, 1);\n\
         \x20     var callId = nextCallId++;\n\
         \x20     return new Promise(function(resolve, reject) {{\n\
         \x20       pending[callId] = {{ resolve: resolve, reject: reject }};\n\
         \x20       post({{ kind: 'invoke', callId: callId, method: method, args: args }});\n\
         \x20     }});\n\
         \x20   }},\n\
         \x20   emit: function(name, data) {{\n\
         \x20     post({{ kind: 'event', name: name, data: data }});\n\
         \x20   }},\n\
         \x20   _onResult: function(callId, outcome) {{\n\
         \x20     var entry = pending[callId];\n\
         \x20     if (!entry) {{ return; }}\n\
         \x20     delete pending[callId];\n\
         \x20     if ('err' in outcome) {{ entry.reject(outcome.err); }}\n\
         \x20     else {{ entry.resolve(outcome.ok); }}\n\
         \x20   }}\n\
         \x20 }};\n\
         }})();"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        invokes: Mutex<Vec<(String, usize)>>,
        events: Mutex<Vec<String>>,
    }

    impl BridgeHandler for Recorder {
        fn on_invoke(
            &self,
            method: &str,
            args: &[serde_json::Value],
        ) -> Result<serde_json::Value, String> {
            self.invokes
                .lock()
                .unwrap()
                .push((method.to_string(), args.len()));
            match method {
                "getInfo" => Ok(serde_json::json!({ "name": "visor" })),
                other => Err(format!("unknown method: {other}")),
            }
        }

        fn on_event(&self, name: &str, _data: &serde_json::Value) {
            self.events.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn test_dispatch_invoke_replies_with_result() {
        let recorder = Recorder::default();
        let reply = dispatch(
            &recorder,
            r#"{"kind":"invoke","callId":7,"method":"getInfo","args":[1,2]}"#,
            BRIDGE_GLOBAL,
        )
        .expect("invoke produces a reply");
        assert_eq!(
            reply,
            r#"window.backend._onResult(7,{"ok":{"name":"visor"}})"#
        );
        assert_eq!(
            recorder.invokes.lock().unwrap().as_slice(),
            &[("getInfo".to_string(), 2)]
        );
    }

    #[test]
    fn test_dispatch_invoke_error_rejects() {
        let recorder = Recorder::default();
        let reply = dispatch(
            &recorder,
            r#"{"kind":"invoke","callId":3,"method":"nope"}"#,
            BRIDGE_GLOBAL,
        )
        .expect("failed invoke still produces a reply");
        assert_eq!(
            reply,
            r#"window.backend._onResult(3,{"err":"unknown method: nope"})"#
        );
    }

    #[test]
    fn test_dispatch_invoke_without_call_id_or_args() {
        let recorder = Recorder::default();
        let reply = dispatch(
            &recorder,
            r#"{"kind":"invoke","method":"getInfo"}"#,
            BRIDGE_GLOBAL,
        )
        .expect("invoke produces a reply");
        assert!(reply.starts_with("window.backend._onResult(0,"));
        assert_eq!(
            recorder.invokes.lock().unwrap().as_slice(),
            &[("getInfo".to_string(), 0)]
        );
    }

    #[test]
    fn test_dispatch_event_has_no_reply() {
        let recorder = Recorder::default();
        let reply = dispatch(
            &recorder,
            r#"{"kind":"event","name":"ready","data":{}}"#,
            BRIDGE_GLOBAL,
        );
        assert!(reply.is_none());
        assert_eq!(
            recorder.events.lock().unwrap().as_slice(),
            &["ready".to_string()]
        );
    }

    #[test]
    fn test_dispatch_drops_malformed_payload() {
        let recorder = Recorder::default();
        assert!(dispatch(&recorder, "not json", BRIDGE_GLOBAL).is_none());
        assert!(dispatch(&recorder, r#"{"kind":"unknown"}"#, BRIDGE_GLOBAL).is_none());
        assert!(recorder.invokes.lock().unwrap().is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bootstrap_script_embeds_global_and_post() {
        let script = bootstrap_script(
            BRIDGE_GLOBAL,
            "window.webkit.messageHandlers.visorBridge.postMessage",
        );
        assert!(script.contains("window.backend ="));
        assert!(script.contains("if (window.backend)"));
        assert!(script.contains("window.webkit.messageHandlers.visorBridge.postMessage"));
    }

    #[test]
    fn test_bootstrap_script_wires_promises() {
        let script = bootstrap_script(BRIDGE_GLOBAL, "post");
        assert!(script.contains("new Promise"));
        assert!(script.contains("callId: callId"));
        assert!(script.contains("_onResult: function(callId, outcome)"));
    }
}
