// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Display frame-rate reader.
//!
//! Most display drivers expose the measured refresh as a text node such as
//! `fps: 59.9 duration:500000 frame_count:30`; the first number is the fps.

use crate::{FrameSample, MetricFamily, MetricSource, MonitorError, SourcePaths, SysfsNode};
use metric_row::Reading;

/// Reads fps from a display driver node.
#[derive(Debug, Clone)]
pub struct SysfsFrameSource {
    node: SysfsNode,
}

impl SysfsFrameSource {
    pub fn new(paths: &SourcePaths) -> Self {
        Self {
            node: paths.fps.clone(),
        }
    }
}

impl MetricSource for SysfsFrameSource {
    type Sample = FrameSample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Frame
    }

    fn read(&self) -> Result<FrameSample, MonitorError> {
        // A negative counter means the driver has no measurement yet.
        let fps = match self.node.read() {
            Ok(v) if v >= 0.0 => Reading::Value(v),
            _ => Reading::Unavailable,
        };
        Ok(FrameSample { fps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(content: Option<&str>) -> (tempfile::TempDir, SysfsFrameSource) {
        let dir = tempfile::tempdir().unwrap();
        let paths = SourcePaths::default().rooted_at(dir.path());
        if let Some(content) = content {
            std::fs::create_dir_all(paths.fps.path.parent().unwrap()).unwrap();
            std::fs::write(&paths.fps.path, content).unwrap();
        }
        (dir, SysfsFrameSource::new(&paths))
    }

    #[test]
    fn test_labelled_fps() {
        let (_dir, src) = source_with(Some("fps: 59.9 duration:500000 frame_count:30"));
        assert_eq!(src.read().unwrap().fps, Reading::Value(59.9));
    }

    #[test]
    fn test_negative_fps_unavailable() {
        let (_dir, src) = source_with(Some("-1"));
        assert_eq!(src.read().unwrap().fps, Reading::Unavailable);
    }

    #[test]
    fn test_missing_node() {
        let (_dir, src) = source_with(None);
        assert_eq!(src.read().unwrap().fps, Reading::Unavailable);
    }
}
