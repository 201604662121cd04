use crate::error::IngestError;

pub const DEFAULT_SEPARATOR: char = '\n';
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Separator-aware splitting parameters. Validated at construction: the
/// overlap must leave room for new content in every chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    separator: char,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(separator: char, chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk size must be positive".to_string(),
            ));
        }

        if chunk_overlap >= chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            )));
        }

        Ok(Self {
            separator,
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits `text` into chunks of at most `chunk_size` characters, preferring
/// separator boundaries and carrying up to `chunk_overlap` trailing
/// characters from each chunk into the next so neighbours share context.
///
/// Pieces longer than a whole chunk are force-split at the size boundary.
/// Empty or whitespace-only input yields no chunks.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces: Vec<Vec<char>> = Vec::new();
    for piece in text.split(config.separator) {
        if piece.is_empty() {
            continue;
        }

        let chars: Vec<char> = piece.chars().collect();
        if chars.len() <= config.chunk_size {
            pieces.push(chars);
        } else {
            let mut start = 0;
            while start < chars.len() {
                let end = (start + config.chunk_size).min(chars.len());
                pieces.push(chars[start..end].to_vec());
                start = end;
            }
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<char> = Vec::new();

    for piece in pieces {
        if current.is_empty() {
            current = piece;
            continue;
        }

        if current.len() + 1 + piece.len() <= config.chunk_size {
            current.push(config.separator);
            current.extend_from_slice(&piece);
            continue;
        }

        chunks.push(current.iter().collect());

        // Seed the next chunk with the tail of the one just flushed. The
        // carried tail shrinks when the incoming piece leaves no room for it.
        let room = config.chunk_size.saturating_sub(piece.len() + 1);
        let carry = config.chunk_overlap.min(room).min(current.len());
        let mut next: Vec<char> = current[current.len() - carry..].to_vec();
        if !next.is_empty() {
            next.push(config.separator);
        }
        next.extend_from_slice(&piece);
        current = next;
    }

    if !current.is_empty() {
        chunks.push(current.iter().collect());
    }

    chunks
}
