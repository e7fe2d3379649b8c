//! Image and object sizing under min/max constraints (CSS 2.1 section 10.4).
use gridpress_types::Size;

/// Natural size plus requested dimensions and bounds, all in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRequest {
    pub natural: Size,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
    /// Scale up to the max bounds when both are finite.
    pub stretch: bool,
}

impl SizeRequest {
    pub fn new(natural: Size) -> Self {
        Self {
            natural,
            width: None,
            height: None,
            min_width: 0.0,
            max_width: f64::INFINITY,
            min_height: 0.0,
            max_height: f64::INFINITY,
            stretch: false,
        }
    }
}

/// Resolves the final size of an object, keeping its aspect ratio where the
/// constraint table allows it.
pub fn resolve_size(request: &SizeRequest) -> Size {
    let natural = request.natural;
    let min_w = request.min_width.max(0.0);
    let min_h = request.min_height.max(0.0);
    // a max below the min is raised to the min
    let max_w = request.max_width.max(min_w);
    let max_h = request.max_height.max(min_h);

    if natural.is_empty() {
        return Size::new(
            request.width.unwrap_or(natural.width).max(0.0),
            request.height.unwrap_or(natural.height).max(0.0),
        );
    }

    if request.stretch && max_w.is_finite() && max_h.is_finite() {
        let factor = (max_w / natural.width).min(max_h / natural.height);
        if factor > 1.0 {
            return Size::new(natural.width * factor, natural.height * factor);
        }
    }

    let (w, h) = match (request.width, request.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * natural.height / natural.width),
        (None, Some(h)) => (h * natural.width / natural.height, h),
        (None, None) => (natural.width, natural.height),
    };
    if w <= 0.0 || h <= 0.0 {
        return Size::new(w.max(0.0), h.max(0.0));
    }

    let (width, height) = if w > max_w && h > max_h {
        if max_w / w <= max_h / h {
            (max_w, min_h.max(max_w * h / w))
        } else {
            (min_w.max(max_h * w / h), max_h)
        }
    } else if w < min_w && h < min_h {
        if min_w / w <= min_h / h {
            (max_w.min(min_h * w / h), min_h)
        } else {
            (min_w, max_h.min(min_w * h / w))
        }
    } else if w < min_w && h > max_h {
        (min_w, max_h)
    } else if w > max_w && h < min_h {
        (max_w, min_h)
    } else if w > max_w {
        (max_w, (max_w * h / w).max(min_h))
    } else if w < min_w {
        (min_w, (min_w * h / w).min(max_h))
    } else if h > max_h {
        ((max_h * w / h).max(min_w), max_h)
    } else if h < min_h {
        ((min_h * w / h).min(max_w), min_h)
    } else {
        (w, h)
    };
    Size::new(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SizeRequest {
        SizeRequest::new(Size::new(100.0, 70.0))
    }

    fn approx(size: Size, w: f64, h: f64) {
        assert!(
            (size.width - w).abs() < 1e-9 && (size.height - h).abs() < 1e-9,
            "expected {}x{}, got {}x{}",
            w,
            h,
            size.width,
            size.height
        );
    }

    #[test]
    fn test_unconstrained_keeps_natural_size() {
        approx(resolve_size(&request()), 100.0, 70.0);
    }

    #[test]
    fn test_stretch_does_not_shrink() {
        let r = SizeRequest {
            max_width: 50.0,
            max_height: 50.0,
            stretch: true,
            ..request()
        };
        approx(resolve_size(&r), 50.0, 35.0);
    }

    #[test]
    fn test_stretch_scales_up_to_tighter_bound() {
        let r = SizeRequest {
            max_width: 300.0,
            max_height: 140.0,
            stretch: true,
            ..request()
        };
        approx(resolve_size(&r), 200.0, 140.0);

        // stretch needs both bounds
        let r = SizeRequest {
            max_width: 300.0,
            stretch: true,
            ..request()
        };
        approx(resolve_size(&r), 100.0, 70.0);
    }

    #[test]
    fn test_min_width_already_met() {
        let r = SizeRequest {
            min_width: 100.0,
            ..request()
        };
        approx(resolve_size(&r), 100.0, 70.0);
    }

    #[test]
    fn test_single_bound_violations() {
        let r = SizeRequest { max_width: 50.0, ..request() };
        approx(resolve_size(&r), 50.0, 35.0);
        let r = SizeRequest { min_width: 200.0, ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
        let r = SizeRequest { max_height: 35.0, ..request() };
        approx(resolve_size(&r), 50.0, 35.0);
        let r = SizeRequest { min_height: 140.0, ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
        // the other dimension still honours its own bound
        let r = SizeRequest { max_width: 50.0, min_height: 40.0, ..request() };
        approx(resolve_size(&r), 50.0, 40.0);
    }

    #[test]
    fn test_both_above_max_tie_break() {
        // width is the tighter constraint
        let r = SizeRequest { max_width: 50.0, max_height: 60.0, ..request() };
        approx(resolve_size(&r), 50.0, 35.0);
        // height is the tighter constraint
        let r = SizeRequest { max_width: 90.0, max_height: 35.0, ..request() };
        approx(resolve_size(&r), 50.0, 35.0);
        // the min bound wins over the proportional value
        let r = SizeRequest { max_width: 50.0, max_height: 60.0, min_height: 45.0, ..request() };
        approx(resolve_size(&r), 50.0, 45.0);
    }

    #[test]
    fn test_both_below_min_tie_break() {
        let r = SizeRequest { min_width: 200.0, min_height: 100.0, ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
        let r = SizeRequest { min_width: 110.0, min_height: 140.0, ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
        let r = SizeRequest { min_width: 110.0, min_height: 140.0, max_width: 150.0, ..request() };
        approx(resolve_size(&r), 150.0, 140.0);
    }

    #[test]
    fn test_crossed_violations() {
        let r = SizeRequest { min_width: 120.0, max_height: 50.0, ..request() };
        approx(resolve_size(&r), 120.0, 50.0);
        let r = SizeRequest { max_width: 80.0, min_height: 90.0, ..request() };
        approx(resolve_size(&r), 80.0, 90.0);
    }

    #[test]
    fn test_requested_dimensions() {
        let r = SizeRequest { width: Some(50.0), ..request() };
        approx(resolve_size(&r), 50.0, 35.0);
        let r = SizeRequest { height: Some(140.0), ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
        let r = SizeRequest { width: Some(10.0), height: Some(10.0), ..request() };
        approx(resolve_size(&r), 10.0, 10.0);
        let r = SizeRequest { width: Some(400.0), max_width: 200.0, ..request() };
        approx(resolve_size(&r), 200.0, 140.0);
    }

    #[test]
    fn test_max_below_min_is_raised() {
        let r = SizeRequest { min_width: 120.0, max_width: 60.0, ..request() };
        approx(resolve_size(&r), 120.0, 84.0);
    }
}
