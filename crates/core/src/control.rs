/// How controls are held between shooting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlType {
    /// Piecewise constant: one control per interval.
    #[default]
    Constant,
    /// Piecewise linear and continuous: one control per node.
    LinearContinuous,
    /// Piecewise constant with an extra control on the last node.
    ConstantWithLastNode,
}

impl ControlType {
    /// Returns the number of control columns of a phase with `n_shooting`
    /// intervals, or `None` if the optimization vector cannot hold this
    /// control type.
    #[must_use]
    pub fn control_nodes(self, n_shooting: usize) -> Option<usize> {
        match self {
            ControlType::Constant => Some(n_shooting),
            ControlType::LinearContinuous => Some(n_shooting + 1),
            ControlType::ConstantWithLastNode => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_nodes_per_type() {
        assert_eq!(ControlType::Constant.control_nodes(10), Some(10));
        assert_eq!(ControlType::LinearContinuous.control_nodes(10), Some(11));
        assert_eq!(ControlType::ConstantWithLastNode.control_nodes(10), None);
    }
}
