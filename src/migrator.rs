use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_barang_table::Migration),
            Box::new(m20240101_000003_create_jasa_table::Migration),
            Box::new(m20240101_000004_create_keranjang_table::Migration),
            Box::new(m20240101_000005_create_transaksi_table::Migration),
            Box::new(m20240101_000006_create_notifikasi_table::Migration),
            Box::new(m20240101_000007_create_user_feedback_table::Migration),
            Box::new(m20240101_000008_create_user_likes_barang_table::Migration),
            Box::new(m20240101_000009_create_pekerja_table::Migration),
        ]
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    NoHp,
    Alamat,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Barang {
    Table,
    Id,
    KodeBarang,
    NamaBarang,
    Deskripsi,
    Merek,
    Kategori,
    HargaBeli,
    HargaJual,
    Diskon,
    Stok,
    Display,
    StatusRekomendasi,
    Gambar,
    GambarDeskripsi,
    CreatedAt,
    UpdatedAt,
}

mod m20240101_000001_create_users_table {
    use super::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(10)
                                .not_null()
                                .default("user"),
                        )
                        .col(ColumnDef::new(Users::NoHp).string().null())
                        .col(ColumnDef::new(Users::Alamat).text().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_barang_table {
    use super::Barang;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_barang_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Barang::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Barang::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Barang::KodeBarang).string().not_null())
                        .col(ColumnDef::new(Barang::NamaBarang).string().not_null())
                        .col(ColumnDef::new(Barang::Deskripsi).text().null())
                        .col(ColumnDef::new(Barang::Merek).string().null())
                        .col(ColumnDef::new(Barang::Kategori).string().not_null())
                        .col(
                            ColumnDef::new(Barang::HargaBeli)
                                .decimal_len(15, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Barang::HargaJual)
                                .decimal_len(15, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Barang::Diskon)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Barang::Stok).integer().not_null().default(0))
                        .col(
                            ColumnDef::new(Barang::Display)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Barang::StatusRekomendasi)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Barang::Gambar).string().null())
                        .col(ColumnDef::new(Barang::GambarDeskripsi).json().not_null())
                        .col(
                            ColumnDef::new(Barang::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Barang::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_barang_kode_barang")
                        .table(Barang::Table)
                        .col(Barang::KodeBarang)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_barang_kategori")
                        .table(Barang::Table)
                        .col(Barang::Kategori)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Barang::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_jasa_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_jasa_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Jasa::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Jasa::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Jasa::KodeJasa).string().not_null())
                        .col(ColumnDef::new(Jasa::NamaJasa).string().not_null())
                        .col(ColumnDef::new(Jasa::Deskripsi).text().null())
                        .col(ColumnDef::new(Jasa::Kategori).string().not_null())
                        .col(
                            ColumnDef::new(Jasa::Harga)
                                .decimal_len(15, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Jasa::Display)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Jasa::StatusRekomendasi)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Jasa::Foto).string().null())
                        .col(ColumnDef::new(Jasa::Snk).text().null())
                        .col(
                            ColumnDef::new(Jasa::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Jasa::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jasa_kode_jasa")
                        .table(Jasa::Table)
                        .col(Jasa::KodeJasa)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Jasa::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Jasa {
        Table,
        Id,
        KodeJasa,
        NamaJasa,
        Deskripsi,
        Kategori,
        Harga,
        Display,
        StatusRekomendasi,
        Foto,
        Snk,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_keranjang_table {
    use super::{Barang, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_keranjang_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Keranjang::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Keranjang::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Keranjang::UserId).uuid().not_null())
                        .col(ColumnDef::new(Keranjang::BarangId).uuid().not_null())
                        .col(
                            ColumnDef::new(Keranjang::Jumlah)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Keranjang::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Keranjang::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_keranjang_user")
                                .from(Keranjang::Table, Keranjang::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_keranjang_barang")
                                .from(Keranjang::Table, Keranjang::BarangId)
                                .to(Barang::Table, Barang::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_keranjang_user_barang")
                        .table(Keranjang::Table)
                        .col(Keranjang::UserId)
                        .col(Keranjang::BarangId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Keranjang::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Keranjang {
        Table,
        Id,
        UserId,
        BarangId,
        Jumlah,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_transaksi_table {
    use super::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_transaksi_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transaksi::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transaksi::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Transaksi::KodeTransaksi).string().not_null())
                        .col(ColumnDef::new(Transaksi::UserId).uuid().not_null())
                        .col(ColumnDef::new(Transaksi::Items).json().not_null())
                        .col(
                            ColumnDef::new(Transaksi::TotalHarga)
                                .decimal_len(15, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::DiskonTotal)
                                .decimal_len(15, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Transaksi::TotalBayar)
                                .decimal_len(15, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::Status)
                                .string_len(24)
                                .not_null()
                                .default("menunggu_pembayaran"),
                        )
                        .col(
                            ColumnDef::new(Transaksi::MetodePembayaran)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transaksi::AlamatPengiriman).text().null())
                        .col(ColumnDef::new(Transaksi::Catatan).text().null())
                        .col(
                            ColumnDef::new(Transaksi::BatasPembayaran)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transaksi::BuktiPembayaran).string().null())
                        .col(
                            ColumnDef::new(Transaksi::DibayarAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::DiprosesAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::SelesaiAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::DibatalkanAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Transaksi::AlasanBatal).string().null())
                        .col(
                            ColumnDef::new(Transaksi::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transaksi::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transaksi_user")
                                .from(Transaksi::Table, Transaksi::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaksi_kode_transaksi")
                        .table(Transaksi::Table)
                        .col(Transaksi::KodeTransaksi)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaksi_user_id")
                        .table(Transaksi::Table)
                        .col(Transaksi::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaksi_status_batas")
                        .table(Transaksi::Table)
                        .col(Transaksi::Status)
                        .col(Transaksi::BatasPembayaran)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transaksi::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Transaksi {
        Table,
        Id,
        KodeTransaksi,
        UserId,
        Items,
        TotalHarga,
        DiskonTotal,
        TotalBayar,
        Status,
        MetodePembayaran,
        AlamatPengiriman,
        Catatan,
        BatasPembayaran,
        BuktiPembayaran,
        DibayarAt,
        DiprosesAt,
        SelesaiAt,
        DibatalkanAt,
        AlasanBatal,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_notifikasi_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_notifikasi_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifikasi::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifikasi::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifikasi::UserId).uuid().null())
                        .col(ColumnDef::new(Notifikasi::Tipe).string_len(20).not_null())
                        .col(ColumnDef::new(Notifikasi::Judul).string().not_null())
                        .col(ColumnDef::new(Notifikasi::Pesan).text().not_null())
                        .col(ColumnDef::new(Notifikasi::Data).json().null())
                        .col(
                            ColumnDef::new(Notifikasi::Dibaca)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifikasi::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifikasi_user_dibaca")
                        .table(Notifikasi::Table)
                        .col(Notifikasi::UserId)
                        .col(Notifikasi::Dibaca)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifikasi::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Notifikasi {
        Table,
        Id,
        UserId,
        Tipe,
        Judul,
        Pesan,
        Data,
        Dibaca,
        CreatedAt,
    }
}

mod m20240101_000007_create_user_feedback_table {
    use super::{Barang, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_user_feedback_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserFeedback::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserFeedback::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UserFeedback::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserFeedback::BarangId).uuid().not_null())
                        .col(ColumnDef::new(UserFeedback::Rating).integer().not_null())
                        .col(ColumnDef::new(UserFeedback::Feedback).text().null())
                        .col(
                            ColumnDef::new(UserFeedback::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UserFeedback::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_feedback_user")
                                .from(UserFeedback::Table, UserFeedback::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_feedback_barang")
                                .from(UserFeedback::Table, UserFeedback::BarangId)
                                .to(Barang::Table, Barang::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_feedback_user_barang")
                        .table(UserFeedback::Table)
                        .col(UserFeedback::UserId)
                        .col(UserFeedback::BarangId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserFeedback::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum UserFeedback {
        Table,
        Id,
        UserId,
        BarangId,
        Rating,
        Feedback,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_user_likes_barang_table {
    use super::{Barang, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_user_likes_barang_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserLikesBarang::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserLikesBarang::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UserLikesBarang::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserLikesBarang::BarangId).uuid().not_null())
                        .col(
                            ColumnDef::new(UserLikesBarang::Liked)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(UserLikesBarang::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UserLikesBarang::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_likes_barang_user")
                                .from(UserLikesBarang::Table, UserLikesBarang::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_likes_barang_barang")
                                .from(UserLikesBarang::Table, UserLikesBarang::BarangId)
                                .to(Barang::Table, Barang::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_likes_barang_user_barang")
                        .table(UserLikesBarang::Table)
                        .col(UserLikesBarang::UserId)
                        .col(UserLikesBarang::BarangId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserLikesBarang::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum UserLikesBarang {
        Table,
        Id,
        UserId,
        BarangId,
        Liked,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000009_create_pekerja_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_pekerja_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pekerja::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Pekerja::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Pekerja::NamaPekerja).string().not_null())
                        .col(ColumnDef::new(Pekerja::Jabatan).string().not_null())
                        .col(ColumnDef::new(Pekerja::NoHp).string().null())
                        .col(
                            ColumnDef::new(Pekerja::Status)
                                .string_len(10)
                                .not_null()
                                .default("standby"),
                        )
                        .col(
                            ColumnDef::new(Pekerja::BusyMulai)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Pekerja::BusySelesai)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Pekerja::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Pekerja::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pekerja::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Pekerja {
        Table,
        Id,
        NamaPekerja,
        Jabatan,
        NoHp,
        Status,
        BusyMulai,
        BusySelesai,
        CreatedAt,
        UpdatedAt,
    }
}
