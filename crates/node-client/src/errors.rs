use std::fmt::{Display, Formatter};


/// The node answered with a non-success HTTP status.
#[derive(Debug)]
pub struct UnexpectedStatus {
    pub method: &'static str,
    pub status: u16,
    pub body: Option<String>
}


impl Display for UnexpectedStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} request failed with HTTP {}", self.method, self.status)?;
        if let Some(body) = self.body.as_ref() {
            write!(f, ": {}", body)?;
        }
        Ok(())
    }
}


impl std::error::Error for UnexpectedStatus {}


/// The node reported an error the exporter does not know how to interpret.
#[derive(Debug)]
pub struct NodeError {
    pub method: &'static str,
    pub message: String
}


impl Display for NodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node returned an error for {}: {}", self.method, self.message)
    }
}


impl std::error::Error for NodeError {}
