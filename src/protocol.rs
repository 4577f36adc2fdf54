//! Messages exchanged with a UI host
//!
//! Requests and responses serialize as JSON objects tagged by a `type` field
//! with camelCase names, e.g. `{"type": "readSlice", "width": 256, ...}`.

use crate::types::ViewingPlane;
use serde::{Deserialize, Serialize};

fn little_endian_default() -> bool {
    true
}

/// Request for one rendered slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceRequest {
    pub width: usize,
    pub height: usize,
    /// Signed so that hosts sending a negative index get a typed error
    pub slice: i64,
    /// Element type name, e.g. "uint16"
    pub data_type: String,
    /// `true` for little-endian samples
    #[serde(default = "little_endian_default")]
    pub endianness: bool,
    #[serde(default)]
    pub plane: ViewingPlane,
    /// Missing bounds are filled from the slice's own extrema
    #[serde(default)]
    pub window_min: Option<f64>,
    #[serde(default)]
    pub window_max: Option<f64>,
}

/// Request for the number of slices along a plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceCountRequest {
    pub width: usize,
    pub height: usize,
    pub data_type: String,
    #[serde(default)]
    pub plane: ViewingPlane,
}

/// Request for a window spanning the whole volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    pub data_type: String,
    #[serde(default = "little_endian_default")]
    pub endianness: bool,
}

/// Messages sent by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Host is ready; answered with [`Response::FileInfo`]
    Ready,
    ReadSlice(SliceRequest),
    CalculateSlices(SliceCountRequest),
    ComputeGlobalWindow(WindowRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub file_size: u64,
    pub file_name: String,
}

/// A slice mapped to 8-bit grayscale, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceData {
    pub width: usize,
    pub height: usize,
    pub slice: usize,
    pub plane: ViewingPlane,
    pub pixels: Vec<u8>,
    pub window_min: f64,
    pub window_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowData {
    pub window_min: f64,
    pub window_max: f64,
}

/// Messages sent back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    FileInfo(FileInfo),
    SliceData(SliceData),
    SliceCount { count: usize },
    WindowData(WindowData),
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_slice_request_defaults() {
        let request: Request = serde_json::from_value(json!({
            "type": "readSlice",
            "width": 256,
            "height": 128,
            "slice": 3,
            "dataType": "int16"
        }))
        .unwrap();

        let request = match request {
            Request::ReadSlice(request) => request,
            other => panic!("expected readSlice, got {:?}", other),
        };
        assert_eq!(request.width, 256);
        assert_eq!(request.data_type, "int16");
        assert!(request.endianness);
        assert_eq!(request.plane, ViewingPlane::Axial);
        assert_eq!(request.window_min, None);
    }

    #[test]
    fn test_request_variants() {
        let ready: Request = serde_json::from_str(r#"{"type":"ready"}"#).unwrap();
        assert_eq!(ready, Request::Ready);

        let count: Request = serde_json::from_value(json!({
            "type": "calculateSlices",
            "width": 10,
            "height": 5,
            "dataType": "uint8",
            "plane": "coronal"
        }))
        .unwrap();
        assert!(matches!(
            count,
            Request::CalculateSlices(SliceCountRequest { plane: ViewingPlane::Coronal, .. })
        ));

        let window: Request = serde_json::from_value(json!({
            "type": "computeGlobalWindow",
            "dataType": "float32",
            "endianness": false
        }))
        .unwrap();
        assert!(matches!(
            window,
            Request::ComputeGlobalWindow(WindowRequest { endianness: false, .. })
        ));
    }

    #[test]
    fn test_response_serialization() {
        let response = Response::WindowData(WindowData {
            window_min: -1.0,
            window_max: 2.5,
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "windowData", "windowMin": -1.0, "windowMax": 2.5})
        );

        let response = Response::SliceCount { count: 4 };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "sliceCount", "count": 4})
        );

        let response = Response::FileInfo(FileInfo {
            file_size: 200,
            file_name: "ct.raw".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "fileInfo", "fileSize": 200, "fileName": "ct.raw"})
        );
    }
}
