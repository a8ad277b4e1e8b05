pub mod barang;
pub mod jasa;
pub mod keranjang;
pub mod notifikasi;
pub mod pekerja;
pub mod transaksi;
pub mod user;
pub mod user_feedback;
pub mod user_likes_barang;

pub use barang::{Entity as Barang, GambarDeskripsi};
pub use jasa::Entity as Jasa;
pub use keranjang::Entity as Keranjang;
pub use notifikasi::{Entity as Notifikasi, TipeNotifikasi};
pub use pekerja::{Entity as Pekerja, StatusPekerja};
pub use transaksi::{Entity as Transaksi, ItemSnapshot, MetodePembayaran, StatusTransaksi};
pub use user::{Entity as User, UserRole};
pub use user_feedback::Entity as UserFeedback;
pub use user_likes_barang::Entity as UserLikesBarang;
