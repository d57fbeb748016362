/// Which side to pin when scaling an image down. At most one side is set;
/// the other is inferred from the aspect ratio. Empty means no resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizePolicy {
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
}

impl ResizePolicy {
    /// Pin the longer side to `max_dimension` when the image exceeds it.
    /// Width is pinned only when strictly wider than tall, so squares are
    /// constrained by height.
    pub fn for_dimensions(width: u32, height: u32, max_dimension: u32) -> Self {
        if width.max(height) <= max_dimension {
            return Self::default();
        }

        if width > height {
            Self {
                target_width: Some(max_dimension),
                target_height: None,
            }
        } else {
            Self {
                target_width: None,
                target_height: Some(max_dimension),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target_width.is_none() && self.target_height.is_none()
    }

    /// Final `(width, height)` after applying the policy to a source size.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match (self.target_width, self.target_height) {
            (Some(w), _) => (w, scale_side(height, w, width)),
            (None, Some(h)) => (scale_side(width, h, height), h),
            (None, None) => (width, height),
        }
    }
}

fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    if reference == 0 {
        return side.max(1);
    }
    let scaled = (f64::from(side) * f64::from(target) / f64::from(reference)).round();
    (scaled as u32).max(1)
}
