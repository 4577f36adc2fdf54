//! Volume access - main API for reading slices from raw volume files
//!
//! The free functions take element types by name, the way UI hosts send
//! them. [`RawVolumeAccess`] ties one file in a [`FileCache`] to the host
//! message protocol.

use crate::cache::FileCache;
use crate::config::ViewerConfig;
use crate::error::{RawSliceError, Result};
use crate::io::create_file_access;
use crate::protocol::{
    FileInfo, Request, Response, SliceCountRequest, SliceData, SliceRequest, WindowData,
    WindowRequest,
};
use crate::slice::{self, Slice, VolumeGeometry};
use crate::stats::compute_extrema;
use crate::types::{ByteOrder, ElementType, Extrema, ViewingPlane, Window};
use crate::window;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bytes per sample for an element type name
pub fn get_bytes_per_pixel(element_type: &str) -> Result<usize> {
    Ok(element_type.parse::<ElementType>()?.bytes_per_pixel())
}

/// Element type for slice geometry; an unknown name is invalid metadata here
fn geometry_element_type(name: &str) -> Result<ElementType> {
    name.parse::<ElementType>()
        .map_err(|e| RawSliceError::InvalidMetadata(e.to_string()))
}

/// Extract one slice from a whole-volume buffer
pub fn extract_slice(
    buffer: &[u8],
    width: usize,
    height: usize,
    slice: i64,
    element_type: &str,
    plane: ViewingPlane,
) -> Result<Slice> {
    let geometry = VolumeGeometry::new(width, height, geometry_element_type(element_type)?)?;
    slice::extract_slice(buffer, &geometry, slice, plane)
}

/// Minimum and maximum over every complete sample in `buffer`
pub fn compute_global_extrema(
    buffer: &[u8],
    element_type: &str,
    little_endian: bool,
) -> Result<Extrema> {
    Ok(compute_extrema(
        buffer,
        element_type.parse::<ElementType>()?,
        ByteOrder::from_little_endian(little_endian),
    ))
}

/// Decode raw slice bytes and window them to grayscale
pub fn map_samples_to_grayscale(
    bytes: &[u8],
    element_type: &str,
    little_endian: bool,
    window_min: f64,
    window_max: f64,
) -> Result<Vec<u8>> {
    Ok(window::map_samples_to_grayscale(
        bytes,
        element_type.parse::<ElementType>()?,
        ByteOrder::from_little_endian(little_endian),
        Window::new(window_min, window_max),
    ))
}

/// Number of slices available along `plane`
pub fn max_slice_count(
    file_len: u64,
    width: usize,
    height: usize,
    element_type: &str,
    plane: ViewingPlane,
) -> Result<usize> {
    slice::max_slice_count(
        file_len,
        width,
        height,
        geometry_element_type(element_type)?,
        plane,
    )
}

/// One open raw volume file, backed by a shared [`FileCache`]
pub struct RawVolumeAccess {
    cache: Arc<FileCache>,
    key: String,
    config: ViewerConfig,
}

impl RawVolumeAccess {
    /// Attach to resource `key` in an existing cache
    pub fn new(cache: Arc<FileCache>, key: impl Into<String>, config: ViewerConfig) -> Self {
        Self {
            cache,
            key: key.into(),
            config,
        }
    }

    /// Open a local raw volume by `file://` URL or path
    pub async fn open(url: &str, config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        if !config.is_supported_path(url) {
            return Err(RawSliceError::Configuration(format!(
                "Unsupported file extension: {}",
                url
            )));
        }

        let (access, key) = create_file_access(url)?;
        let cache = Arc::new(FileCache::new(Arc::from(access), config.max_file_size));
        let volume = Self::new(cache, key, config);
        volume.cache.get(&volume.key).await?;
        debug!(key = %volume.key, "opened raw volume");
        Ok(volume)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<FileCache> {
        &self.cache
    }

    /// File name and size
    pub async fn file_info(&self) -> Result<FileInfo> {
        let file_size = self.cache.size(&self.key).await?;
        let file_name = std::path::Path::new(&self.key)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.key)
            .to_string();
        Ok(FileInfo {
            file_size,
            file_name,
        })
    }

    /// Number of slices for the requested geometry
    pub async fn slice_count(&self, request: &SliceCountRequest) -> Result<usize> {
        let file_len = self.cache.size(&self.key).await?;
        max_slice_count(
            file_len,
            request.width,
            request.height,
            &request.data_type,
            request.plane,
        )
    }

    /// Read, extract and window one slice
    pub async fn read_slice(&self, request: &SliceRequest) -> Result<SliceData> {
        let element_type = geometry_element_type(&request.data_type)?;
        let geometry = VolumeGeometry::new(request.width, request.height, element_type)?;
        let index = slice::check_slice_index(request.slice)?;
        let data = self.cache.get(&self.key).await?;
        let slice = slice::extract_slice(&data, &geometry, request.slice, request.plane)?;

        let byte_order = ByteOrder::from_little_endian(request.endianness);
        let window = match (request.window_min, request.window_max) {
            (Some(min), Some(max)) => Window::new(min, max),
            (min, max) => {
                let extrema = compute_extrema(&slice.data, element_type, byte_order);
                Window::new(min.unwrap_or(extrema.min), max.unwrap_or(extrema.max))
            }
        };
        let pixels =
            window::map_samples_to_grayscale(&slice.data, element_type, byte_order, window);

        debug!(
            key = %self.key,
            slice = request.slice,
            plane = %request.plane,
            width = slice.width,
            height = slice.height,
            "read slice"
        );

        Ok(SliceData {
            width: slice.width,
            height: slice.height,
            slice: index,
            plane: request.plane,
            pixels,
            window_min: window.min,
            window_max: window.max,
        })
    }

    /// Window spanning the whole volume, memoised per element type and byte order
    pub async fn global_window(&self, request: &WindowRequest) -> Result<Window> {
        let element_type = request.data_type.parse::<ElementType>()?;
        let extrema = self
            .cache
            .global_extrema(
                &self.key,
                element_type,
                ByteOrder::from_little_endian(request.endianness),
            )
            .await?;
        Ok(extrema.into())
    }

    /// Answer one host request; failures become [`Response::Error`]
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ready => match self.file_info().await {
                Ok(info) => Response::FileInfo(info),
                Err(err) => error_response("Failed to read file info", err),
            },
            Request::ReadSlice(request) => match self.read_slice(&request).await {
                Ok(data) => Response::SliceData(data),
                Err(err) => error_response("Failed to read slice", err),
            },
            Request::CalculateSlices(request) => {
                let count = self.slice_count(&request).await.unwrap_or_else(|err| {
                    warn!(%err, "slice count unavailable");
                    0
                });
                Response::SliceCount { count }
            }
            Request::ComputeGlobalWindow(request) => match self.global_window(&request).await {
                Ok(window) => Response::WindowData(WindowData {
                    window_min: window.min,
                    window_max: window.max,
                }),
                Err(err) => error_response("Failed to compute window", err),
            },
        }
    }

    /// Release this volume's cached data; returns whether anything was cached
    pub fn close(self) -> bool {
        self.cache.evict(&self.key)
    }
}

fn error_response(context: &str, err: RawSliceError) -> Response {
    warn!(%err, "{}", context);
    Response::Error {
        message: format!("{}: {}", context, err),
    }
}
