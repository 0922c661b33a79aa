mod cipher;

pub use cipher::Pbkdf2AesGcmCipher;
