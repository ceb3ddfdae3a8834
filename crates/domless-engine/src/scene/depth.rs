/// Hands out paint-order depths.
///
/// Raising a widget takes a depth above every depth handed out so far, so
/// the raised widget occludes all of its current siblings.
#[derive(Debug, Default)]
pub struct DepthStack {
    top: i32,
}

impl DepthStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest depth handed out so far.
    #[inline]
    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bring_to_top(&mut self) -> i32 {
        self.top += 1;
        self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_raise_is_strictly_higher() {
        let mut depths = DepthStack::new();
        let a = depths.bring_to_top();
        let b = depths.bring_to_top();
        assert!(b > a);
        assert_eq!(depths.top(), b);
    }
}
