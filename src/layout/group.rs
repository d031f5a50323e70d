//! Group overlay - children share one origin and one size.

use super::Sizer;
use crate::error::PlotResult;
use crate::types::{ComponentId, Size, SpaceRequest};

/// Element-wise max of the children's requests; wants flags are OR-ed.
pub fn requested_space(
    sizer: &mut dyn Sizer,
    children: &[ComponentId],
    offered: Size<f64>,
) -> PlotResult<SpaceRequest> {
    let mut request = SpaceRequest::NONE;
    for &child in children {
        let r = sizer.requested_space(child, offered)?;
        request.width = request.width.max(r.width);
        request.height = request.height.max(r.height);
        request.wants_width |= r.wants_width;
        request.wants_height |= r.wants_height;
    }
    Ok(request)
}

/// Fixed along an axis only when every child is.
pub fn is_fixed(sizer: &mut dyn Sizer, children: &[ComponentId]) -> PlotResult<(bool, bool)> {
    let mut fixed = (true, true);
    for &child in children {
        let (w, h) = sizer.is_fixed(child)?;
        fixed.0 &= w;
        fixed.1 &= h;
    }
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::FakeSizer;
    use crate::types::size;

    #[test]
    fn test_overlay_request() {
        let mut sizer = FakeSizer::default();
        let a = sizer.fixed(30.0, 10.0);
        let b = sizer.greedy(20.0, 40.0);

        let request = requested_space(&mut sizer, &[a, b], size(100.0, 100.0)).unwrap();
        assert_eq!(request.width, 30.0);
        assert_eq!(request.height, 40.0);
        assert!(request.wants_width);
        assert!(request.wants_height);
    }

    #[test]
    fn test_empty_group() {
        let mut sizer = FakeSizer::default();
        let request = requested_space(&mut sizer, &[], size(10.0, 10.0)).unwrap();
        assert_eq!(request, SpaceRequest::NONE);
        assert_eq!(is_fixed(&mut sizer, &[]).unwrap(), (true, true));
    }

    #[test]
    fn test_fixed_only_if_all_fixed() {
        let mut sizer = FakeSizer::default();
        let a = sizer.fixed(1.0, 1.0);
        let b = sizer.greedy(1.0, 1.0);
        assert_eq!(is_fixed(&mut sizer, &[a]).unwrap(), (true, true));
        assert_eq!(is_fixed(&mut sizer, &[a, b]).unwrap(), (false, false));
    }
}
