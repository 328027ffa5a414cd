/// Fixed resource endpoints of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Auth,
    Register,
    Services,
    /// The backend routes customers under a capitalised segment.
    Customers,
    Transactions,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Auth => "/auth",
            Endpoint::Register => "/auth/register",
            Endpoint::Services => "/services",
            Endpoint::Customers => "/Customers",
            Endpoint::Transactions => "/transactions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Auth.path(), "/auth");
        assert_eq!(Endpoint::Register.path(), "/auth/register");
        assert_eq!(Endpoint::Services.path(), "/services");
        assert_eq!(Endpoint::Customers.path(), "/Customers");
        assert_eq!(Endpoint::Transactions.path(), "/transactions");
    }
}
