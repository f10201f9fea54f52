//! Serial device discovery.
//!
//! Candidate devices are the entries of the device directory whose file
//! name starts with a fixed prefix (`ttyACM` for USB CDC boards).

use crate::{Error, Result, DEVICE_DIR, DEVICE_PREFIX};
use std::num::IntErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Lists candidate LED controllers under `/dev`.
pub fn list_devices() -> Vec<String> {
    list_devices_in(DEVICE_DIR, DEVICE_PREFIX)
}

/// Lists full paths of entries in `dir` whose name starts with `prefix`.
///
/// Never fails: an unreadable directory yields an empty list.
pub fn list_devices_in<P: AsRef<Path>>(dir: P, prefix: &str) -> Vec<String> {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to scan {:?} for devices: {}", dir, e);
            return Vec::new();
        }
    };

    let names = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok());

    let mut matched = filter_device_names(names, prefix);
    sort_device_names(&mut matched);
    debug!("Found {} device(s) in {:?}", matched.len(), dir);

    matched
        .into_iter()
        .map(|name| dir.join(name).to_string_lossy().into_owned())
        .collect()
}

/// Lists ports reported by the serial backend whose name matches `prefix`.
pub fn list_serial_ports(prefix: &str) -> Vec<String> {
    match tokio_serial::available_ports() {
        Ok(ports) => {
            let mut names: Vec<String> = ports
                .into_iter()
                .map(|port| port.port_name)
                .filter(|name| file_name(name).starts_with(prefix))
                .collect();
            sort_device_names(&mut names);
            names
        }
        Err(e) => {
            warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

/// Keeps the names starting with `prefix`, in input order.
pub fn filter_device_names<I, S>(names: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|name| name.as_ref().starts_with(prefix))
        .map(|name| name.as_ref().to_string())
        .collect()
}

/// Resolves a 1-based console selection to an index into `count` devices.
///
/// Empty input picks the first device; numbers outside `1..=count` are
/// clamped into range.
pub fn select_device(input: &str, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(Error::NoDeviceFound);
    }
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    let last = i64::try_from(count).unwrap_or(i64::MAX);
    let chosen = match input.parse::<i64>() {
        Ok(chosen) => chosen,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => last,
            IntErrorKind::NegOverflow => 1,
            _ => return Err(Error::InvalidSelection(input.to_string())),
        },
    };
    Ok((chosen.clamp(1, last) - 1) as usize)
}

/// Orders `ttyACM2` before `ttyACM10`.
fn sort_device_names(names: &mut [String]) {
    names.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_filter_device_names() {
        let names = ["ttyACM0", "ttyUSB0", "ttyACM12"];
        assert_eq!(
            filter_device_names(names, "ttyACM"),
            vec!["ttyACM0", "ttyACM12"]
        );
        assert!(filter_device_names(["ttyS0", "null"], "ttyACM").is_empty());
    }

    #[test]
    fn test_list_devices_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ttyACM10", "ttyUSB0", "ttyACM2", "null", "xttyACM3"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let found = list_devices_in(dir.path(), "ttyACM");

        let expected: Vec<String> = ["ttyACM2", "ttyACM10"]
            .iter()
            .map(|n| dir.path().join(n).to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_list_devices_empty_or_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_devices_in(dir.path(), "ttyACM").is_empty());
        assert!(list_devices_in(dir.path().join("missing"), "ttyACM").is_empty());
    }

    #[test]
    fn test_select_device() {
        assert_eq!(select_device("", 3).unwrap(), 0);
        assert_eq!(select_device("  \n", 3).unwrap(), 0);
        assert_eq!(select_device("2", 3).unwrap(), 1);
        assert_eq!(select_device("0", 3).unwrap(), 0);
        assert_eq!(select_device("-4", 3).unwrap(), 0);
        assert_eq!(select_device("99", 3).unwrap(), 2);
        assert_eq!(select_device("99999999999999999999", 3).unwrap(), 2);
        assert_eq!(select_device("-99999999999999999999", 3).unwrap(), 0);
        assert_eq!(select_device("+2", 3).unwrap(), 1);
        assert!(matches!(
            select_device("abc", 3),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(select_device("1", 0), Err(Error::NoDeviceFound)));
    }

    #[test]
    fn test_list_devices_under_dev() {
        for device in list_devices() {
            assert!(device.starts_with("/dev/ttyACM"), "{device}");
        }
    }

    #[test]
    fn test_list_serial_ports_matches_prefix() {
        for port in list_serial_ports("ttyACM") {
            assert!(file_name(&port).starts_with("ttyACM"), "{port}");
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/dev/ttyACM0"), "ttyACM0");
        assert_eq!(file_name("COM3"), "COM3");
    }
}
