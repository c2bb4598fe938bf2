//! Evaluation of many faces with one scheme.
//!
//! Every face is validated against the scheme's layout before any flux is
//! computed, so a malformed input leaves all outputs untouched.

use crate::error::{Result, Tne2Error};

use super::traits::{ConvectiveFlux, FaceInputs, FluxOutput};

fn validate_batch<S: ConvectiveFlux + ?Sized>(
    scheme: &S,
    faces: &[FaceInputs<'_>],
    outputs: &[FluxOutput],
) -> Result<()> {
    if faces.len() != outputs.len() {
        return Err(Tne2Error::dimension_mismatch(
            format!("{} flux outputs", faces.len()),
            format!("{}", outputs.len()),
        ));
    }
    let layout = scheme.layout();
    for face in faces {
        face.validate(&layout)?;
    }
    Ok(())
}

/// Evaluate `faces` in order, writing face k into `outputs[k]`.
pub fn compute_faces<S: ConvectiveFlux + ?Sized>(
    scheme: &mut S,
    faces: &[FaceInputs<'_>],
    outputs: &mut [FluxOutput],
) -> Result<()> {
    validate_batch(scheme, faces, outputs)?;
    for (face, out) in faces.iter().zip(outputs.iter_mut()) {
        scheme.compute(face, out);
    }
    Ok(())
}

/// Parallel version of [`compute_faces`] using Rayon.
///
/// Each worker evaluates with its own clone of `scheme`, so scratch
/// storage is never shared.
#[cfg(feature = "parallel")]
pub fn compute_faces_parallel<S>(
    scheme: &S,
    faces: &[FaceInputs<'_>],
    outputs: &mut [FluxOutput],
) -> Result<()>
where
    S: ConvectiveFlux + Clone + Sync,
{
    use rayon::prelude::*;

    validate_batch(scheme, faces, outputs)?;
    outputs
        .par_iter_mut()
        .zip(faces.par_iter())
        .for_each_init(|| scheme.clone(), |local, (out, face)| local.compute(face, out));
    Ok(())
}
