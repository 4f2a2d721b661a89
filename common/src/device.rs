use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "videoinput")]
    VideoInput,
    #[serde(rename = "audioinput")]
    AudioInput,
    #[serde(rename = "audiooutput")]
    AudioOutput,
}

impl DeviceKind {
    fn fallback_label(&self, index: usize) -> String {
        match self {
            DeviceKind::VideoInput => format!("Camera {}", index + 1),
            DeviceKind::AudioInput => format!("Microphone {}", index + 1),
            DeviceKind::AudioOutput => format!("Speaker {}", index + 1),
        }
    }

    fn empty_label(&self) -> &'static str {
        match self {
            DeviceKind::VideoInput => "No cameras found",
            DeviceKind::AudioInput => "No microphones found",
            DeviceKind::AudioOutput => "No speakers found",
        }
    }
}

/// A capture device as reported by the platform. Ids are only as stable as
/// the platform makes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Empty until the user granted media permission
    #[serde(default)]
    pub label: String,
}

/// One entry of a device selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Available input devices, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    pub cameras: Vec<DeviceInfo>,
    pub microphones: Vec<DeviceInfo>,
}

impl DeviceList {
    pub fn from_devices(devices: impl IntoIterator<Item = DeviceInfo>) -> Self {
        let mut list = DeviceList::default();
        for device in devices {
            match device.kind {
                DeviceKind::VideoInput => list.cameras.push(device),
                DeviceKind::AudioInput => list.microphones.push(device),
                DeviceKind::AudioOutput => {}
            }
        }
        list
    }

    pub fn devices(&self, kind: DeviceKind) -> &[DeviceInfo] {
        match kind {
            DeviceKind::VideoInput => &self.cameras,
            DeviceKind::AudioInput => &self.microphones,
            DeviceKind::AudioOutput => &[],
        }
    }

    /// Selector entries for `kind`: first device selected, a placeholder with
    /// an empty value when there is none
    pub fn options(&self, kind: DeviceKind) -> Vec<SelectOption> {
        let devices = self.devices(kind);
        if devices.is_empty() {
            return vec![SelectOption {
                value: String::new(),
                label: kind.empty_label().to_string(),
                selected: true,
            }];
        }

        devices
            .iter()
            .enumerate()
            .map(|(index, device)| SelectOption {
                value: device.device_id.clone(),
                label: if device.label.is_empty() {
                    kind.fallback_label(index)
                } else {
                    device.label.clone()
                },
                selected: index == 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, kind: DeviceKind, label: &str) -> DeviceInfo {
        DeviceInfo {
            device_id: id.to_string(),
            kind,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_split_by_kind() {
        let list = DeviceList::from_devices(vec![
            device("c1", DeviceKind::VideoInput, "FaceTime HD"),
            device("m1", DeviceKind::AudioInput, ""),
            device("s1", DeviceKind::AudioOutput, "Speakers"),
            device("c2", DeviceKind::VideoInput, ""),
        ]);

        assert_eq!(list.cameras.len(), 2);
        assert_eq!(list.microphones.len(), 1);
    }

    #[test]
    fn test_options_use_fallback_labels() {
        let list = DeviceList::from_devices(vec![
            device("c1", DeviceKind::VideoInput, "FaceTime HD"),
            device("c2", DeviceKind::VideoInput, ""),
        ]);

        let options = list.options(DeviceKind::VideoInput);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "FaceTime HD");
        assert!(options[0].selected);
        assert_eq!(options[1].label, "Camera 2");
        assert_eq!(options[1].value, "c2");
        assert!(!options[1].selected);
    }

    #[test]
    fn test_empty_placeholder() {
        let list = DeviceList::default();
        let options = list.options(DeviceKind::AudioInput);
        assert_eq!(
            options,
            vec![SelectOption {
                value: String::new(),
                label: "No microphones found".to_string(),
                selected: true,
            }]
        );
    }

    #[test]
    fn test_device_kind_wire_names() {
        let kind: DeviceKind = serde_json::from_str("\"videoinput\"").unwrap();
        assert_eq!(kind, DeviceKind::VideoInput);
        assert_eq!(serde_json::to_string(&DeviceKind::AudioInput).unwrap(), "\"audioinput\"");
    }
}
