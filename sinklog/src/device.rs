// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;

/// Describes the host application. Usually built with `app_info!()`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AppInfo {
    pub name: String,
    pub identifier: String,
    pub version: String,
    pub build: Option<String>,
}

impl AppInfo {
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            version: version.into(),
            build: None,
        }
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }
}

/// Describes the machine and operating system.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    pub model: String,
    pub os_name: String,
    pub os_version: String,
}

impl DeviceInfo {
    pub fn current() -> Self {
        #[cfg(unix)]
        {
            if let Some(info) = uname() {
                return info;
            }
        }

        Self {
            model: std::env::consts::ARCH.to_string(),
            os_name: std::env::consts::OS.to_string(),
            os_version: "unknown".to_string(),
        }
    }
}

#[cfg(unix)]
fn uname() -> Option<DeviceInfo> {
    let mut name: libc::utsname = unsafe { core::mem::zeroed() };
    if unsafe { libc::uname(&mut name) } != 0 {
        return None;
    }

    fn field(raw: &[libc::c_char]) -> String {
        let bytes: Vec<u8> = raw
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    Some(DeviceInfo {
        model: field(&name.machine),
        os_name: field(&name.sysname),
        os_version: field(&name.release),
    })
}

struct Description<'a> {
    app: &'a AppInfo,
    device: &'a DeviceInfo,
}

impl fmt::Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app = self.app;
        write!(f, "{} ({}) {}", app.name, app.identifier, app.version)?;
        if let Some(build) = &app.build {
            write!(f, " ({build})")?;
        }
        write!(
            f,
            " on {} running {} {}",
            self.device.model, self.device.os_name, self.device.os_version
        )
    }
}

/// `name (identifier) version (build) on model running os version`
pub(crate) fn describe(app: &AppInfo, device: &DeviceInfo) -> String {
    Description { app, device }.to_string()
}
