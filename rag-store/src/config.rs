//! Chunking, embedding and retrieval configuration.

use std::str::FromStr;

use crate::errors::RagError;

/// Distance function used by the in-memory index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceKind {
    /// Euclidean distance (L2), the flat-index default.
    #[default]
    Euclid,
    /// Cosine similarity.
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
}

impl DistanceKind {
    /// Similarity of `a` and `b`; higher always means closer.
    ///
    /// Euclid is reported as the negated L2 distance.
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceKind::Euclid => -a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            DistanceKind::Dot => dot(a, b),
            DistanceKind::Cosine => {
                let norm_a = dot(a, a).sqrt();
                let norm_b = dot(b, b).sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot(a, b) / (norm_a * norm_b)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceKind::Euclid => "euclid",
            DistanceKind::Cosine => "cosine",
            DistanceKind::Dot => "dot",
        }
    }
}

impl FromStr for DistanceKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclid" | "l2" => Ok(DistanceKind::Euclid),
            "cosine" => Ok(DistanceKind::Cosine),
            "dot" => Ok(DistanceKind::Dot),
            other => Err(RagError::Config(format!("unknown distance `{other}`"))),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// How document text is cut into chunks. Lengths are in characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks; must be `< chunk_size`.
    pub chunk_overlap: usize,
    /// Preferred split point; empty means raw length-based slicing only.
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 20,
            separator: "\n".to_string(),
        }
    }
}

impl ChunkingConfig {
    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Configuration for chunking, embedding and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    /// Distance function of the index.
    pub distance: DistanceKind,
    /// Inputs per embeddings request.
    pub embed_batch: usize,
    /// Embedding requests in flight for one document.
    pub embed_concurrency: usize,
    /// Default number of chunks retrieved per question.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            distance: DistanceKind::Euclid,
            embed_batch: 256,
            embed_concurrency: 2,
            top_k: 4,
        }
    }
}

impl RagConfig {
    /// Builds config from environment variables, defaulting unset ones.
    ///
    /// Reads `CHUNK_SIZE`, `CHUNK_OVERLAP`, `CHUNK_SEPARATOR` (`\n` escapes
    /// are honoured), `RAG_DISTANCE`, `EMBEDDING_BATCH_SIZE`,
    /// `EMBEDDING_CONCURRENCY` and `RAG_TOP_K`.
    ///
    /// # Errors
    /// Returns `RagError::Config` for unparsable or invalid values.
    pub fn from_env() -> Result<Self, RagError> {
        let dflt = Self::default();
        let cfg = Self {
            chunking: ChunkingConfig {
                chunk_size: parse_env("CHUNK_SIZE", dflt.chunking.chunk_size)?,
                chunk_overlap: parse_env("CHUNK_OVERLAP", dflt.chunking.chunk_overlap)?,
                separator: std::env::var("CHUNK_SEPARATOR")
                    .map(|s| unescape(&s))
                    .unwrap_or(dflt.chunking.separator),
            },
            distance: match std::env::var("RAG_DISTANCE") {
                Ok(v) if !v.trim().is_empty() => v.parse()?,
                _ => dflt.distance,
            },
            embed_batch: parse_env("EMBEDDING_BATCH_SIZE", dflt.embed_batch)?,
            embed_concurrency: parse_env("EMBEDDING_CONCURRENCY", dflt.embed_concurrency)?,
            top_k: parse_env("RAG_TOP_K", dflt.top_k)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        self.chunking.validate()?;
        if self.embed_batch == 0 {
            return Err(RagError::Config("embed_batch must be > 0".into()));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::Config("embed_concurrency must be > 0".into()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        Ok(())
    }
}

fn parse_env(name: &str, default: usize) -> Result<usize, RagError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| RagError::Config(format!("{name} must be a non-negative integer"))),
        _ => Ok(default),
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n").replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let mut c = ChunkingConfig::default();
        assert!(c.validate().is_ok());
        c.chunk_overlap = c.chunk_size;
        assert!(c.validate().is_err());
        c.chunk_size = 0;
        c.chunk_overlap = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn distance_scores_rank_closer_higher() {
        let q = [1.0, 0.0];
        let near = [0.9, 0.1];
        let far = [0.0, 1.0];
        for kind in [DistanceKind::Euclid, DistanceKind::Cosine, DistanceKind::Dot] {
            assert!(kind.score(&q, &near) > kind.score(&q, &far), "{kind:?}");
        }
        assert_eq!(DistanceKind::Cosine.score(&q, &[0.0, 0.0]), 0.0);
        assert_eq!(DistanceKind::Euclid.score(&q, &q), 0.0);
    }

    #[test]
    fn distance_parses_names() {
        assert_eq!("L2".parse::<DistanceKind>().unwrap(), DistanceKind::Euclid);
        assert_eq!(" cosine ".parse::<DistanceKind>().unwrap(), DistanceKind::Cosine);
        assert!("manhattan".parse::<DistanceKind>().is_err());
    }

    #[test]
    fn separator_escapes() {
        assert_eq!(unescape("\\n\\n"), "\n\n");
    }
}
