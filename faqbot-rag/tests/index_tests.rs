//! Property tests for vector index search ordering and bounds.

use faqbot_rag::document::Chunk;
use faqbot_rag::embedding::EmbeddingProvider;
use faqbot_rag::error::Result;
use faqbot_rag::index::VectorIndex;
use proptest::prelude::*;

/// Returns embeddings from a fixed table keyed by chunk text.
struct TableEmbedder {
    table: Vec<(String, Vec<f32>)>,
    dim: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for TableEmbedder {
    fn name(&self) -> &str {
        "table"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .table
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, e)| e.clone())
            .unwrap_or_else(|| vec![0.0; self.dim]))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn chunk(i: usize) -> Chunk {
    let text = format!("chunk number {i}");
    Chunk {
        id: format!("doc_{i}"),
        document_id: "doc".into(),
        index: i,
        end: text.len(),
        text,
        start: 0,
        metadata: Default::default(),
    }
}

/// *For any* set of embedded chunks, searching returns results ordered by
/// descending cosine similarity, at most `top_k` of them, and exactly
/// `min(top_k, len)` of them.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
            batch_size in 1usize..8,
        ) {
            let chunks: Vec<Chunk> = (0..embeddings.len()).map(chunk).collect();
            let embedder = TableEmbedder {
                table: chunks.iter().map(|c| c.text.clone()).zip(embeddings.clone()).collect(),
                dim: DIM,
            };
            let count = chunks.len();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let index = rt.block_on(VectorIndex::build(chunks, &embedder, batch_size)).unwrap();
            let results = index.search(&query, top_k).unwrap();

            prop_assert_eq!(index.len(), count);
            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(count));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
                if window[0].score == window[1].score {
                    prop_assert!(window[0].chunk.index < window[1].chunk.index);
                }
            }
        }
    }
}
