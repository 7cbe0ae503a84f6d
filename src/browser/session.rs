use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;

/// Request sent to the bridge script over stdin (one JSON line).
///
/// Element handles are opaque ids minted by the bridge when a `locate`
/// resolves; every later command refers back to them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BridgeRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Locate {
        cmd: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<u64>,
        query: Query,
    },
    Closest {
        cmd: &'static str,
        handle: u64,
        query: Query,
    },
    Handle {
        cmd: &'static str,
        handle: u64,
    },
    Attr {
        cmd: &'static str,
        handle: u64,
        name: String,
    },
    Click {
        cmd: &'static str,
        handle: u64,
        forced: bool,
    },
    Fill {
        cmd: &'static str,
        handle: u64,
        value: String,
    },
    Press {
        cmd: &'static str,
        handle: u64,
        key: String,
    },
    SetChecked {
        cmd: &'static str,
        handle: u64,
        checked: bool,
    },
    Select {
        cmd: &'static str,
        handle: u64,
        by: &'static str,
        value: String,
    },
    PressKey {
        cmd: &'static str,
        key: String,
    },
    Settle {
        cmd: &'static str,
        ms: u64,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BridgeRequest {
    pub fn navigate(url: &str) -> Self {
        BridgeRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn locate(scope: Option<u64>, query: &Query) -> Self {
        BridgeRequest::Locate {
            cmd: "locate",
            scope,
            query: query.clone(),
        }
    }

    pub fn closest(handle: u64, query: &Query) -> Self {
        BridgeRequest::Closest {
            cmd: "closest",
            handle,
            query: query.clone(),
        }
    }

    pub fn handle_cmd(cmd: &'static str, handle: u64) -> Self {
        BridgeRequest::Handle { cmd, handle }
    }

    pub fn attr(handle: u64, name: &str) -> Self {
        BridgeRequest::Attr {
            cmd: "attr",
            handle,
            name: name.to_string(),
        }
    }

    pub fn click(handle: u64, forced: bool) -> Self {
        BridgeRequest::Click {
            cmd: "click",
            handle,
            forced,
        }
    }

    pub fn fill(handle: u64, value: &str) -> Self {
        BridgeRequest::Fill {
            cmd: "fill",
            handle,
            value: value.to_string(),
        }
    }

    pub fn press(handle: u64, key: &str) -> Self {
        BridgeRequest::Press {
            cmd: "press",
            handle,
            key: key.to_string(),
        }
    }

    pub fn set_checked(handle: u64, checked: bool) -> Self {
        BridgeRequest::SetChecked {
            cmd: "set_checked",
            handle,
            checked,
        }
    }

    pub fn select(handle: u64, by: &'static str, value: &str) -> Self {
        BridgeRequest::Select {
            cmd: "select",
            handle,
            by,
            value: value.to_string(),
        }
    }

    pub fn press_key(key: &str) -> Self {
        BridgeRequest::PressKey {
            cmd: "press_key",
            key: key.to_string(),
        }
    }

    pub fn settle(ms: u64) -> Self {
        BridgeRequest::Settle { cmd: "settle", ms }
    }

    pub fn quit() -> Self {
        BridgeRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the bridge script over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub handles: Option<Vec<u64>>,
    #[serde(default)]
    pub handle: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub flag: Option<bool>,
}

struct SessionInner {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl SessionInner {
    fn send(&mut self, request: &BridgeRequest) -> Result<BridgeResponse, EngineError> {
        let json =
            serde_json::to_string(request).map_err(|e| EngineError::json("BridgeRequest", e))?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| EngineError::SessionIo(format!("failed to write to bridge stdin: {e}")))?;
        self.stdin
            .flush()
            .map_err(|e| EngineError::SessionIo(format!("failed to flush bridge stdin: {e}")))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| EngineError::SessionIo(format!("failed to read bridge stdout: {e}")))?;
        if line.trim().is_empty() {
            return Err(EngineError::SessionIo(
                "empty response from bridge (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| EngineError::json("bridge response", e))
    }

    fn send_ok(
        &mut self,
        request: &BridgeRequest,
        command: &str,
    ) -> Result<BridgeResponse, EngineError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(EngineError::SessionProtocol {
                command: command.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }
}

/// A persistent browser session backed by the Node.js bridge script.
///
/// Spawns a long-lived process that keeps a Chromium page open. Commands go
/// out as NDJSON over stdin, responses come back over stdout, one line each.
/// Single-threaded by design; handles share the pipe through `RefCell`.
pub struct BrowserSession {
    inner: Rc<RefCell<SessionInner>>,
}

impl BrowserSession {
    /// Spawn the bridge and wait for its ready signal.
    pub fn launch(script: &str) -> Result<Self, EngineError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::SessionIo("failed to capture bridge stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::SessionIo("failed to capture bridge stdout".into()))?;
        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| EngineError::SessionIo(format!("failed to read ready signal: {e}")))?;
        let response: BridgeResponse = serde_json::from_str(line.trim())
            .map_err(|e| EngineError::json("bridge ready signal", e))?;
        if !response.ok || response.ready != Some(true) {
            return Err(EngineError::SessionProtocol {
                command: "launch".into(),
                error: "did not receive ready signal from bridge".into(),
            });
        }

        Ok(BrowserSession {
            inner: Rc::new(RefCell::new(SessionInner {
                child,
                stdin,
                reader,
            })),
        })
    }

    pub fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::navigate(url), "navigate")?;
        Ok(())
    }

    /// Best-effort shutdown; never fails if the process is already gone.
    pub fn quit(&self) {
        let mut inner = self.inner.borrow_mut();
        let _ = inner.send(&BridgeRequest::quit());
        let _ = inner.child.wait();
    }

    fn element(&self, handle: u64) -> Box<dyn DomElement> {
        Box::new(RemoteElement {
            inner: Rc::clone(&self.inner),
            handle,
        })
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.quit();
    }
}

impl DomPage for BrowserSession {
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::locate(None, query), "locate")?;
        Ok(response
            .handles
            .unwrap_or_default()
            .into_iter()
            .map(|h| self.element(h))
            .collect())
    }

    fn press_key(&self, key: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::press_key(key), "press_key")?;
        Ok(())
    }

    fn settle(&self, ms: u64) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::settle(ms), "settle")?;
        Ok(())
    }
}

/// Live element behind the bridge, addressed by its minted handle.
struct RemoteElement {
    inner: Rc<RefCell<SessionInner>>,
    handle: u64,
}

impl RemoteElement {
    fn boxed(&self, handle: u64) -> Box<dyn DomElement> {
        Box::new(RemoteElement {
            inner: Rc::clone(&self.inner),
            handle,
        })
    }

    fn text_of(&self, cmd: &'static str) -> Result<String, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::handle_cmd(cmd, self.handle), cmd)?;
        Ok(response.text.unwrap_or_default())
    }

    fn flag_of(&self, cmd: &'static str) -> Result<bool, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::handle_cmd(cmd, self.handle), cmd)?;
        Ok(response.flag.unwrap_or(false))
    }
}

impl DomElement for RemoteElement {
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::locate(Some(self.handle), query), "locate")?;
        Ok(response
            .handles
            .unwrap_or_default()
            .into_iter()
            .map(|h| self.boxed(h))
            .collect())
    }

    fn closest(&self, query: &Query) -> Result<Option<Box<dyn DomElement>>, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::closest(self.handle, query), "closest")?;
        Ok(response.handle.map(|h| self.boxed(h)))
    }

    fn tag(&self) -> Result<String, EngineError> {
        self.text_of("tag")
    }

    fn inner_text(&self) -> Result<String, EngineError> {
        self.text_of("inner_text")
    }

    fn attr(&self, name: &str) -> Result<Option<String>, EngineError> {
        let response = self
            .inner
            .borrow_mut()
            .send_ok(&BridgeRequest::attr(self.handle, name), "attr")?;
        Ok(response.text)
    }

    fn input_value(&self) -> Result<String, EngineError> {
        self.text_of("input_value")
    }

    fn click(&self, options: ClickOptions) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::click(self.handle, options.forced), "click")?;
        Ok(())
    }

    fn fill(&self, text: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::fill(self.handle, text), "fill")?;
        Ok(())
    }

    fn press(&self, key: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::press(self.handle, key), "press")?;
        Ok(())
    }

    fn set_checked(&self, checked: bool) -> Result<(), EngineError> {
        self.inner.borrow_mut().send_ok(
            &BridgeRequest::set_checked(self.handle, checked),
            "set_checked",
        )?;
        Ok(())
    }

    fn select_by_label(&self, label: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::select(self.handle, "label", label), "select")?;
        Ok(())
    }

    fn select_by_value(&self, value: &str) -> Result<(), EngineError> {
        self.inner
            .borrow_mut()
            .send_ok(&BridgeRequest::select(self.handle, "value", value), "select")?;
        Ok(())
    }

    fn is_visible(&self) -> Result<bool, EngineError> {
        self.flag_of("is_visible")
    }

    fn is_enabled(&self) -> Result<bool, EngineError> {
        self.flag_of("is_enabled")
    }

    fn is_checked(&self) -> Result<bool, EngineError> {
        self.flag_of("is_checked")
    }
}
