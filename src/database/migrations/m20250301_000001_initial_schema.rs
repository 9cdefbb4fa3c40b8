use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tables in order of dependencies
        self.create_providers_table(manager).await?;
        self.create_lines_table(manager).await?;
        self.create_domains_table(manager).await?;
        self.create_streams_table(manager).await?;
        self.create_stream_paths_table(manager).await?;
        self.create_endpoints_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Endpoints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StreamPaths::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Streams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Providers::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    fn id_column(&self, column: impl IntoIden) -> ColumnDef {
        ColumnDef::new(column)
            .integer()
            .not_null()
            .auto_increment()
            .primary_key()
            .to_owned()
    }

    fn timestamp_column(&self, column: impl IntoIden) -> ColumnDef {
        ColumnDef::new(column)
            .timestamp_with_time_zone()
            .not_null()
            .to_owned()
    }

    fn cascade_foreign_key(
        &self,
        name: &str,
        column: Endpoints,
        table: impl IntoIden + 'static,
        target: impl IntoIden + 'static,
    ) -> ForeignKeyCreateStatement {
        ForeignKey::create()
            .name(name)
            .from(Endpoints::Table, column)
            .to(table, target)
            .on_delete(ForeignKeyAction::Cascade)
            .on_update(ForeignKeyAction::NoAction)
            .to_owned()
    }

    async fn create_providers_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Providers::Table)
                    .if_not_exists()
                    .col(self.id_column(Providers::Id))
                    .col(ColumnDef::new(Providers::Name).string().not_null())
                    .col(ColumnDef::new(Providers::Code).string_len(64).not_null())
                    .col(self.timestamp_column(Providers::CreatedAt))
                    .col(self.timestamp_column(Providers::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_lines_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lines::Table)
                    .if_not_exists()
                    .col(self.id_column(Lines::Id))
                    .col(ColumnDef::new(Lines::ProviderId).integer().not_null())
                    .col(ColumnDef::new(Lines::Name).string().not_null())
                    .col(ColumnDef::new(Lines::Code).string().not_null())
                    .col(ColumnDef::new(Lines::DisplayName).string().not_null())
                    .col(self.timestamp_column(Lines::CreatedAt))
                    .col(self.timestamp_column(Lines::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lines_provider_id")
                            .from(Lines::Table, Lines::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_domains_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(self.id_column(Domains::Id))
                    .col(ColumnDef::new(Domains::Name).string().not_null())
                    .col(self.timestamp_column(Domains::CreatedAt))
                    .col(self.timestamp_column(Domains::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_streams_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Streams::Table)
                    .if_not_exists()
                    .col(self.id_column(Streams::Id))
                    .col(ColumnDef::new(Streams::Name).string().not_null())
                    .col(ColumnDef::new(Streams::Code).string().not_null())
                    .col(ColumnDef::new(Streams::ProviderId).integer().null())
                    .col(self.timestamp_column(Streams::CreatedAt))
                    .col(self.timestamp_column(Streams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_streams_provider_id")
                            .from(Streams::Table, Streams::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_stream_paths_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StreamPaths::Table)
                    .if_not_exists()
                    .col(self.id_column(StreamPaths::Id))
                    .col(ColumnDef::new(StreamPaths::StreamId).integer().not_null())
                    .col(ColumnDef::new(StreamPaths::TableId).string().not_null())
                    .col(ColumnDef::new(StreamPaths::FullPath).string().not_null())
                    .col(self.timestamp_column(StreamPaths::CreatedAt))
                    .col(self.timestamp_column(StreamPaths::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stream_paths_stream_id")
                            .from(StreamPaths::Table, StreamPaths::StreamId)
                            .to(Streams::Table, Streams::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_endpoints_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Endpoints::Table)
                    .if_not_exists()
                    .col(self.id_column(Endpoints::Id))
                    .col(ColumnDef::new(Endpoints::ProviderId).integer().not_null())
                    .col(ColumnDef::new(Endpoints::LineId).integer().not_null())
                    .col(ColumnDef::new(Endpoints::DomainId).integer().not_null())
                    .col(ColumnDef::new(Endpoints::StreamId).integer().not_null())
                    .col(ColumnDef::new(Endpoints::StreamPathId).integer().not_null())
                    .col(ColumnDef::new(Endpoints::FullUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(Endpoints::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Endpoints::Resolution)
                            .string_len(8)
                            .not_null()
                            .default("SD"),
                    )
                    .col(self.timestamp_column(Endpoints::CreatedAt))
                    .col(self.timestamp_column(Endpoints::UpdatedAt))
                    .foreign_key(&mut self.cascade_foreign_key(
                        "fk_endpoints_provider_id",
                        Endpoints::ProviderId,
                        Providers::Table,
                        Providers::Id,
                    ))
                    .foreign_key(&mut self.cascade_foreign_key(
                        "fk_endpoints_line_id",
                        Endpoints::LineId,
                        Lines::Table,
                        Lines::Id,
                    ))
                    .foreign_key(&mut self.cascade_foreign_key(
                        "fk_endpoints_domain_id",
                        Endpoints::DomainId,
                        Domains::Table,
                        Domains::Id,
                    ))
                    .foreign_key(&mut self.cascade_foreign_key(
                        "fk_endpoints_stream_id",
                        Endpoints::StreamId,
                        Streams::Table,
                        Streams::Id,
                    ))
                    .foreign_key(&mut self.cascade_foreign_key(
                        "fk_endpoints_stream_path_id",
                        Endpoints::StreamPathId,
                        StreamPaths::Table,
                        StreamPaths::Id,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_providers_code")
                    .table(Providers::Table)
                    .col(Providers::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_lines_provider_id")
                    .table(Lines::Table)
                    .col(Lines::ProviderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_lines_code")
                    .table(Lines::Table)
                    .col(Lines::Code)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_domains_name")
                    .table(Domains::Table)
                    .col(Domains::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_streams_code")
                    .table(Streams::Table)
                    .col(Streams::Code)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_stream_paths_table_id")
                    .table(StreamPaths::Table)
                    .col(StreamPaths::TableId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_stream_paths_stream_id")
                    .table(StreamPaths::Table)
                    .col(StreamPaths::StreamId)
                    .to_owned(),
            )
            .await?;

        // One endpoint per (line, domain, stream path)
        manager
            .create_index(
                Index::create()
                    .name("idx_endpoints_combination")
                    .table(Endpoints::Table)
                    .col(Endpoints::LineId)
                    .col(Endpoints::DomainId)
                    .col(Endpoints::StreamPathId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        for (name, column) in [
            ("idx_endpoints_provider_id", Endpoints::ProviderId),
            ("idx_endpoints_domain_id", Endpoints::DomainId),
            ("idx_endpoints_stream_id", Endpoints::StreamId),
            ("idx_endpoints_stream_path_id", Endpoints::StreamPathId),
            ("idx_endpoints_status", Endpoints::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Endpoints::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Providers {
    Table,
    Id,
    Name,
    Code,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lines {
    Table,
    Id,
    ProviderId,
    Name,
    Code,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Streams {
    Table,
    Id,
    Name,
    Code,
    ProviderId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StreamPaths {
    Table,
    Id,
    StreamId,
    TableId,
    FullPath,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Endpoints {
    Table,
    Id,
    ProviderId,
    LineId,
    DomainId,
    StreamId,
    StreamPathId,
    FullUrl,
    Status,
    Resolution,
    CreatedAt,
    UpdatedAt,
}
