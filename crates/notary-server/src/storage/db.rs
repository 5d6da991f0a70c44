//! SQLite database for the Notary server.

notary_core::define_database!(NotaryDatabase, "Notary database migrations complete");
