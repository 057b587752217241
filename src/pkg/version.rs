use std::process::Command;

use crate::error::{Error, Result};

/// Report whether `have` is strictly older than `required`.
///
/// Only the leading components both versions share are compared, so `1.4.2` satisfies a
/// requirement of `1.4` and `1` satisfies `1.9`. Every compared component must be numeric.
pub fn is_older(have: &str, required: &str) -> Result<bool> {
    let hp: Vec<&str> = have.split('.').collect();
    let rp: Vec<&str> = required.split('.').collect();

    for (h, r) in hp.iter().zip(rp.iter()) {
        let hv = parse_component(have, h)?;
        let rv = parse_component(required, r)?;
        if hv < rv {
            return Ok(true);
        }
        if hv > rv {
            return Ok(false);
        }
    }
    Ok(false)
}

fn parse_component(version: &str, component: &str) -> Result<u64> {
    component.parse::<u64>().map_err(|_| Error::InvalidVersion {
        version: version.to_string(),
        component: component.to_string(),
    })
}

/// Version of the `go` toolchain on PATH, e.g. `1.21.5`.
pub fn go_version() -> Result<String> {
    let out = Command::new("go")
        .arg("version")
        .output()
        .map_err(Error::CompilerMissing)?;
    let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&out.stderr));
    parse_go_version_output(&text)
}

/// Extract the version from `go version` output (`go version go1.21.5 linux/amd64`).
pub fn parse_go_version_output(out: &str) -> Result<String> {
    let parts: Vec<&str> = out.split(' ').collect();
    if parts.len() < 4 {
        return Err(Error::UnrecognizedCompiler(out.trim().to_string()));
    }
    parts[2]
        .strip_prefix("go")
        .map(str::to_string)
        .ok_or_else(|| Error::UnrecognizedCompiler(out.trim().to_string()))
}
