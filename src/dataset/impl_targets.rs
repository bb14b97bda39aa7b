use super::AsTargets;
use ndarray::{ArrayBase, ArrayView1, Data, Ix1};

/// A NdArray can act as targets
impl<L, S: Data<Elem = L>> AsTargets for ArrayBase<S, Ix1> {
    type Elem = L;

    fn as_targets(&self) -> ArrayView1<L> {
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn view_on_boolean_labels() {
        let targets = array![true, true, false, true];
        let view = targets.as_targets();

        assert_eq!(view.len(), 4);
        assert_eq!(view, targets.view());
        assert_eq!(targets.slice(ndarray::s![1..3]).as_targets(), array![true, false]);
    }
}
