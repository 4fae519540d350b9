//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Time dependence](#time-dependence)
//! - [Absorbing boundaries](#absorbing-boundaries)
//! - [Stability monitoring](#stability-monitoring)
//! - [Eigenstates](#eigenstates)
//!
//! # Background
//! This crate deals with a single particle in two dimensions, whose state is
//! described by a complex wavefunction *ψ*(*x*, *y*, *t*) obeying the
//! time-dependent Schrödinger equation (TDSE)
//! ```text
//!   ∂ψ      1
//! i -- = - --- ∇²ψ + V ψ
//!   ∂t      2
//! ```
//! in units where *ħ* = *m* = 1. The domain is a rectangle discretized into
//! square cells of side *h* = 1/min(*Nx*, *Ny*), so that the shorter side of
//! the domain always has unit length. Fields are sampled at cell centers
//! ```text
//! x[i] = (i + 1/2) h, i ∊ {0, ..., Nx - 1}
//! y[j] = (j + 1/2) h, j ∊ {0, ..., Ny - 1}
//! ```
//! and stored as arrays of shape `(Ny, Nx)`. The field is taken to vanish
//! outside the grid, i.e. the edges of the domain are hard walls.
//!
//! The potential *V* may be complex. Its real part is the ordinary potential
//! energy; a negative imaginary part makes the evolution non-unitary, removing
//! probability at a local rate -2 Im(*V*). The "mass" of a wavefunction is the
//! discrete norm
//! ```text
//! M = ∑ |ψ[j, i]|² h²
//! ```
//! which is conserved exactly by the integrator below whenever Im(*V*) = 0.
//!
//! # Time dependence
//! Formally, a time step *δt* is given by *ψ*(*t* + *δt*) = exp(-i *H* *δt*)
//! *ψ*(*t*). The Hamiltonian is split into kinetic (*T*) and potential (*V*)
//! parts and the propagator is approximated by the symmetric (Strang)
//! product
//! ```text
//! exp(-i H δt) ≈ exp(-i V δt/2) exp(-i T δt) exp(-i V δt/2)
//! ```
//! with an *O*(*δt*³) local error. The potential factors are diagonal and
//! applied exactly by multiplication. The kinetic factor is approximated by
//! the Crank-Nicolson (Cayley) form
//! ```text
//!                1 - i T δt/2
//! exp(-i T δt) ≈ ------------
//!                1 + i T δt/2
//! ```
//! which is unitary and unconditionally stable. With *T* = -(*Dx* + *Dy*)/2,
//! where *Dx* and *Dy* are the three-point second-difference operators, and
//! *α* = i *δt*/4, this is further factored into two alternating-direction
//! implicit (ADI) sweeps,
//! ```text
//! (1 - α Dx) φ  = (1 + α Dy) ψ
//! (1 - α Dy) ψ' = (1 + α Dx) φ
//! ```
//! each of which is a set of independent tridiagonal systems (one per row,
//! then one per column) with diagonal 1 + 2*α*/*h*² and off-diagonals
//! -*α*/*h*². These are solved directly by the Thomas algorithm in *O*(*N*)
//! time. The factorization differs from the unsplit Crank-Nicolson step only
//! by a term proportional to *α*² *Dx* *Dy*, preserving second-order accuracy.
//! Since *Dx* and *Dy* commute and are each Hermitian, the product of the two
//! sweeps is also unitary.
//!
//! # Absorbing boundaries
//! Hard walls reflect. To emulate an open domain, a complex absorbing
//! potential (CAP) is added in a band of width *w* = max(1, round(*r* *N*))
//! cells along each edge, where *r* is the `cap_ratio`. With *s* ∊ [0, 1] the
//! linear depth into the band (the larger of the *x* and *y* depths), the
//! absorbing term is
//! ```text
//! V_cap = -i γ [s² (3 - 2 s)]²
//! ```
//! for `cap_strength` *γ*. The squared smoothstep ramps in without a kink,
//! which limits reflections off the inner edge of the band.
//!
//! # Stability monitoring
//! Neither the TDSE nor the integrator allow the mass to grow, and without a
//! CAP it should not change at all. Numerical trouble (too large a time step
//! for very tall barriers, corrupted input, and the like) therefore shows up
//! as mass drift. At every reset a baseline total mass *M*₀ and interior mass
//! *I*₀ (the mass strictly inside the CAP band) are recorded. After a short
//! warmup, every step compares
//! ```text
//! |M - M₀| / M₀       (CAP disabled)
//! M / M₀ - 1          (CAP enabled)
//! |I - I₀| / I₀
//! |I - I₀| / M₀
//! ```
//! against configurable tolerances. The interior checks are skipped when the
//! interior is too small or initially holds too little of the mass to be
//! meaningful. Any non-finite value in *ψ* is flagged immediately. Once a run
//! is flagged it stays flagged until the next baseline.
//!
//! # Eigenstates
//! Stationary states solve *H* *ψ* = *E* *ψ* with the real Hamiltonian
//! -∇²/2 + Re(*V*) (the CAP is dropped) under the same hard-wall boundary.
//! With the five-point Laplacian, *H* is a sparse, real symmetric matrix of
//! dimension *Nx* *Ny*, far too large to diagonalize directly, but only its
//! lowest few eigenpairs are wanted.
//!
//! The Lanczos method[^1] builds an orthonormal basis {*q*ₖ} of the Krylov
//! space spanned by {*q*₀, *H* *q*₀, *H*² *q*₀, ...} through the three-term
//! recurrence
//! ```text
//! β[k] q[k + 1] = H q[k] - α[k] q[k] - β[k - 1] q[k - 1]
//! α[k] = ⟨q[k], H q[k]⟩
//! ```
//! in which *H* is represented by the tridiagonal matrix with diagonal *α*
//! and off-diagonal *β*. Extremal eigenvalues of this small matrix converge
//! rapidly to those of *H*. In finite precision the basis slowly loses
//! orthogonality, producing spurious copies of converged eigenvalues; this is
//! suppressed by explicitly re-orthogonalizing each new vector against all
//! previous ones. The recurrence stops early when *β* becomes negligible,
//! which means an invariant subspace has been found.
//!
//! The tridiagonal matrix is diagonalized by implicitly shifted QL
//! iteration[^2], which applies a sequence of Givens rotations per sweep and
//! accumulates them into the eigenvector matrix *Z*. The approximate
//! eigenvectors of *H* (Ritz vectors) are then
//! ```text
//! ψₙ = ∑ Z[k, n] q[k]
//! ```
//! Since the Krylov space only sees one direction within each degenerate
//! eigenspace of *H*, degenerate levels typically appear once.
//!
//! [^1]: C. Lanczos, "An iteration method for the solution of the eigenvalue
//! problem of linear differential and integral operators." J. Res. Natl. Bur.
//! Stand. **45** 4 (1950).
//!
//! [^2]: W. H. Press, S. A. Teukolsky, W. T. Vetterling, and B. P. Flannery,
//! *Numerical Recipes: The Art of Scientific Computing* (3rd ed.), §11.4.
//! Cambridge University Press (2007).
