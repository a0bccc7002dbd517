pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_SEPARATOR: &str = "\n";

pub const DEFAULT_TOP_K: usize = 4;

pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 32;
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_CHAT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_GEMINI_EMBEDDING_MODEL: &str = "models/text-embedding-004";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

pub const DEFAULT_WEB_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEB_MAX_BYTES: usize = 5_000_000;

pub const API_KEY_ENV: &str = "DOCCHAT_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about the user's documents. \
Use only the numbered context passages and the prior conversation to answer. \
If the context does not contain the answer, say that you don't know.";

pub const CONDENSE_QUESTION_PROMPT: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.";
