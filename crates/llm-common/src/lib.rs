pub mod completion;
pub mod error;
pub mod openai;

#[cfg(test)]
mod test_server;
