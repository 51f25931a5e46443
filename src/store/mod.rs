pub mod plain;
pub mod fulltext;
