use crate::symbolic::Expr;

/// A rigid-body model driving the dynamics of a phase.
///
/// Only the quantities the optimization vector needs are exposed: the size of
/// the generalized coordinates, velocities and torques, and a symbolic forward
/// dynamics.
pub trait BiomechanicalModel {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the number of generalized coordinates.
    fn nb_q(&self) -> usize;

    /// Returns the number of generalized velocities.
    ///
    /// Defaults to [`nb_q`](Self::nb_q).
    fn nb_qdot(&self) -> usize {
        self.nb_q()
    }

    /// Returns the number of generalized forces.
    fn nb_tau(&self) -> usize;

    fn nb_muscles(&self) -> usize {
        0
    }

    fn nb_markers(&self) -> usize {
        0
    }

    /// Returns the name of each degree of freedom.
    fn name_dof(&self) -> Vec<String>;

    /// Computes the generalized accelerations.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the inputs do not match the model.
    fn forward_dynamics(
        &self,
        q: &[Expr],
        qdot: &[Expr],
        tau: &[Expr],
    ) -> Result<Vec<Expr>, Self::Error>;
}
