/// Element-wise arithmetic mean of equal-length embeddings.
///
/// Returns `None` for an empty set: a video without usable faces must
/// surface as a detection failure, never as a fabricated vector. The
/// mean is deliberately not renormalized; clustering uses cosine
/// distance, which is scale-invariant.
pub fn mean_embedding(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.first()?;
    let mut mean = vec![0.0f32; first.len()];
    for embedding in embeddings {
        debug_assert_eq!(embedding.len(), mean.len());
        for (m, v) in mean.iter_mut().zip(embedding) {
            *m += v;
        }
    }
    let n = embeddings.len() as f32;
    for m in mean.iter_mut() {
        *m /= n;
    }
    Some(mean)
}
