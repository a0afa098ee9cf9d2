//! Main entry point for CLI command to start the storefront GraphQL server.

fn main() -> anyhow::Result<()> {
    storefront_graphql::main()
}
